use glam::Vec3;
use log::{debug, info};
use wgpu;
use wgpu::util::DeviceExt;

use crate::engine::graphics::context::{Frame, GraphicsContext};
use crate::engine::graphics::rect::{Rect, Viewport};
use crate::engine::graphics::shader::ShaderProgram;
use crate::engine::graphics::texture::{Texture, TextureSize};
use crate::engine::graphics::vertex::{QuadGeometry, QUAD_INDICES};

/// Uniform slot receiving the clamped brightness.
pub const BRIGHTNESS_UNIFORM: &str = "brightness";

/// One sprite draw as requested by the caller.
///
/// `None` rectangles fall back to the full texture (source) and the full
/// viewport (destination).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRequest {
    pub source: Option<Rect>,
    pub dest: Option<Rect>,
    pub brightness: f32,
    pub offset: Vec3,
}

impl Default for DrawRequest {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl DrawRequest {
    pub fn new(brightness: f32) -> Self {
        Self {
            source: None,
            dest: None,
            brightness,
            offset: Vec3::ZERO,
        }
    }

    pub fn with_source(mut self, source: Rect) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_dest(mut self, dest: Rect) -> Self {
        self.dest = Some(dest);
        self
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Substitutes defaults and clamps brightness.
    pub fn resolve(&self, texture_size: TextureSize, viewport: Viewport) -> ResolvedDraw {
        let extent = texture_size.as_vec2();
        ResolvedDraw {
            source: self
                .source
                .unwrap_or_else(|| Rect::new(0.0, 0.0, extent.x, extent.y)),
            dest: self.dest.unwrap_or_else(|| viewport.fullscreen_rect()),
            brightness: clamp_brightness(self.brightness),
            offset: self.offset,
        }
    }
}

/// A draw with every default filled in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDraw {
    pub source: Rect,
    pub dest: Rect,
    pub brightness: f32,
    pub offset: Vec3,
}

impl ResolvedDraw {
    pub fn write_into(&self, geometry: &mut QuadGeometry, texture_size: TextureSize) {
        geometry.write_positions(&self.dest, self.offset);
        geometry.write_uvs(&self.source, texture_size);
    }
}

/// Clamps to `[0, 1]`. NaN is treated as fully dark.
pub fn clamp_brightness(brightness: f32) -> f32 {
    if brightness.is_nan() {
        return 0.0;
    }
    brightness.clamp(0.0, 1.0)
}

/// Draws a single textured quad through persistent vertex, UV and index buffers.
pub struct SpriteRenderer {
    texture: Texture,
    viewport: Viewport,
    geometry: QuadGeometry,
    position_buffer: wgpu::Buffer,
    uv_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

impl SpriteRenderer {
    /// Creates the quad buffers once. The index buffer is immutable; the
    /// position and UV buffers are rewritten on every draw.
    pub fn new(device: &wgpu::Device, texture: Texture, viewport: Viewport) -> Self {
        let geometry = QuadGeometry::new();

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Index Buffer"),
            contents: QuadGeometry::index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Position Buffer"),
            contents: geometry.position_bytes(),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let uv_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite UV Buffer"),
            contents: geometry.uv_bytes(),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        info!(
            "Sprite renderer initialised ({}x{} texture)",
            texture.size().width(),
            texture.size().height()
        );

        Self {
            texture,
            viewport,
            geometry,
            position_buffer,
            uv_buffer,
            index_buffer,
        }
    }

    /// Swaps the owned texture; the previous one is destroyed.
    pub fn set_texture(&mut self, texture: Texture) {
        let old = std::mem::replace(&mut self.texture, texture);
        info!(
            "Replaced sprite texture {}x{} with {}x{}",
            old.size().width(),
            old.size().height(),
            self.texture.size().width(),
            self.texture.size().height()
        );
    }

    /// Draws the sprite into `frame` and submits it before returning.
    ///
    /// Each call uses its own submission, so consecutive draws that rewrite
    /// the shared buffers never see each other's data.
    pub fn draw(
        &mut self,
        ctx: &GraphicsContext,
        frame: &Frame,
        program: &mut ShaderProgram,
        request: &DrawRequest,
    ) {
        let texture_size = self.texture.size();
        let resolved = request.resolve(texture_size, self.viewport);

        program.set_uniform_f32(&ctx.queue, BRIGHTNESS_UNIFORM, resolved.brightness);

        resolved.write_into(&mut self.geometry, texture_size);
        ctx.queue
            .write_buffer(&self.position_buffer, 0, self.geometry.position_bytes());
        ctx.queue.write_buffer(&self.uv_buffer, 0, self.geometry.uv_bytes());

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Sprite Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sprite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&program.render_pipeline);
            render_pass.set_bind_group(0, &program.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &self.texture.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.position_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.uv_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
        }
        ctx.queue.submit(std::iter::once(encoder.finish()));

        debug!(
            "Drew sprite src={:?} dst={:?} brightness={}",
            resolved.source, resolved.dest, resolved.brightness
        );
    }
}
