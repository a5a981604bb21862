//! Graphics context provider: surface, device and per-frame targets.

use std::sync::Arc;

use log::{info, warn};
use wgpu;
use winit::window::Window;

use crate::engine::error::{Result, SpriteError};
use crate::engine::graphics::rect::Viewport;

// White, with opaque alpha.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

pub struct GraphicsContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub viewport: Viewport,
    surface: wgpu::Surface<'static>,
    render_format: wgpu::TextureFormat,
}

/// Picks the surface format and the format frames are rendered through.
///
/// Brightness scales stored 8-bit values, so rendering must not go through an
/// sRGB encode. A non-sRGB surface format is preferred; an sRGB-only surface
/// is rendered through its non-sRGB view format.
pub fn select_formats(
    formats: &[wgpu::TextureFormat],
) -> Option<(wgpu::TextureFormat, wgpu::TextureFormat)> {
    if let Some(linear) = formats.iter().copied().find(|f| !f.is_srgb()) {
        return Some((linear, linear));
    }
    let surface_format = formats.first().copied()?;
    Some((surface_format, surface_format.remove_srgb_suffix()))
}

/// A surface texture acquired for one frame. Drawing loads its contents, so
/// several draws can land in the same frame.
pub struct Frame {
    pub view: wgpu::TextureView,
    surface_texture: wgpu::SurfaceTexture,
}

impl Frame {
    pub fn present(self) {
        self.surface_texture.present();
    }
}

impl GraphicsContext {
    pub async fn new(window: Arc<Window>, viewport: Viewport) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| SpriteError::ContextInit(format!("create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| SpriteError::ContextInit("no compatible adapter".to_owned()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|e| SpriteError::ContextInit(format!("request device: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let (surface_format, render_format) = select_formats(&surface_caps.formats)
            .ok_or_else(|| SpriteError::ContextInit("surface reports no formats".to_owned()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            // Fifo is always supported; equivalent to a swap interval of 1.
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: if render_format == surface_format {
                vec![]
            } else {
                vec![render_format]
            },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        info!(
            "Graphics context ready: {:?} (rendering as {:?}) {}x{}, viewport {}x{}",
            surface_format, render_format, config.width, config.height, viewport.width, viewport.height
        );

        Ok(Self {
            device,
            queue,
            config,
            viewport,
            surface,
            render_format,
        })
    }

    /// Format of the views handed out by [`GraphicsContext::begin_frame`].
    pub fn format(&self) -> wgpu::TextureFormat {
        self.render_format
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Acquires the next surface texture and clears it.
    ///
    /// A lost or outdated surface is reconfigured and reported as a
    /// non-fatal [`SpriteError::Surface`]; the caller skips the frame.
    pub fn begin_frame(&mut self) -> Result<Frame> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                warn!("Surface {:?}, reconfiguring", e);
                self.surface.configure(&self.device, &self.config);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor {
                format: Some(self.render_format),
                ..Default::default()
            });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Clear Encoder"),
        });
        {
            let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        Ok(Frame {
            view,
            surface_texture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn non_srgb_surface_format_is_preferred() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(
            select_formats(&formats),
            Some((TextureFormat::Bgra8Unorm, TextureFormat::Bgra8Unorm))
        );
    }

    #[test]
    fn srgb_only_surface_renders_through_linear_view() {
        let formats = [TextureFormat::Rgba8UnormSrgb];
        let (surface, render) = select_formats(&formats).unwrap();
        assert_eq!(surface, TextureFormat::Rgba8UnormSrgb);
        assert_eq!(render, TextureFormat::Rgba8Unorm);
        assert!(!render.is_srgb());
    }

    #[test]
    fn no_formats_is_none() {
        assert_eq!(select_formats(&[]), None);
    }
}
