use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{error, info, trace};
use wgpu;
use wgpu::util::DeviceExt;

use crate::engine::error::{Result, SpriteError};
use crate::engine::graphics::rect::Viewport;
use crate::engine::graphics::texture;
use crate::engine::graphics::uniforms::UniformBlock;
use crate::engine::graphics::vertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStageKind {
    Vertex,
    Fragment,
}

impl ShaderStageKind {
    fn naga_stage(self) -> wgpu::naga::ShaderStage {
        match self {
            ShaderStageKind::Vertex => wgpu::naga::ShaderStage::Vertex,
            ShaderStageKind::Fragment => wgpu::naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStageKind::Vertex => f.write_str("vertex"),
            ShaderStageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// A successfully compiled GLSL stage.
pub struct ShaderStage {
    pub kind: ShaderStageKind,
    pub module: wgpu::ShaderModule,
    pub path: PathBuf,
}

/// GLSL entry point; naga exposes `void main()` under this name.
const ENTRY_POINT: &str = "main";

/// Reads and compiles one shader stage.
///
/// Shaders are static configuration: a read or compile failure comes back as
/// an error carrying the driver log, and callers are expected to terminate.
pub fn compile_stage(
    device: &wgpu::Device,
    path: impl AsRef<Path>,
    kind: ShaderStageKind,
) -> Result<ShaderStage> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| SpriteError::ShaderRead {
        path: path.to_path_buf(),
        source,
    })?;
    compile_source(device, path, &source, kind)
}

/// Compiles `source` as a `kind` stage. `path` is used for labels and diagnostics only.
pub fn compile_source(
    device: &wgpu::Device,
    path: &Path,
    source: &str,
    kind: ShaderStageKind,
) -> Result<ShaderStage> {
    let label = format!("{} shader {}", kind, path.display());

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label.as_str()),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source.to_owned()),
            stage: kind.naga_stage(),
            defines: Default::default(),
        },
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        let log = err.to_string();
        error!("Error --> compile {} shader {}:\n{}", kind, path.display(), log);
        return Err(SpriteError::ShaderCompile {
            path: path.to_path_buf(),
            stage: kind,
            log,
        });
    }

    info!("Compiled {} shader {}", kind, path.display());
    Ok(ShaderStage {
        kind,
        module,
        path: path.to_path_buf(),
    })
}

/// A linked vertex + fragment pair with its uniform block.
///
/// Bind group 0 is the uniform block, bind group 1 the sprite texture.
pub struct ShaderProgram {
    pub render_pipeline: wgpu::RenderPipeline,
    pub uniform_bind_group: wgpu::BindGroup,
    pub texture_bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniforms: UniformBlock,
}

/// Links two compiled stages into a render pipeline targeting `format`.
///
/// Link failure is reported through the log and returned to the caller, who
/// decides whether the process can continue without a usable program.
pub fn link_program(
    device: &wgpu::Device,
    vertex_stage: &ShaderStage,
    fragment_stage: &ShaderStage,
    format: wgpu::TextureFormat,
    viewport: Viewport,
) -> Result<ShaderProgram> {
    if vertex_stage.kind != ShaderStageKind::Vertex || fragment_stage.kind != ShaderStageKind::Fragment {
        let log = format!(
            "expected vertex + fragment stages, got {} ({}) + {} ({})",
            vertex_stage.kind,
            vertex_stage.path.display(),
            fragment_stage.kind,
            fragment_stage.path.display()
        );
        error!("Error --> link program: {}", log);
        return Err(SpriteError::ShaderLink(log));
    }

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let mut uniforms = UniformBlock::default();
    uniforms.set("viewport_width", viewport.width as f32);
    uniforms.set("viewport_height", viewport.height as f32);

    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Sprite Uniform Buffer"),
        contents: uniforms.as_bytes(),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let uniform_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Sprite Uniform Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: std::num::NonZeroU64::new(UniformBlock::SIZE),
            },
            count: None,
        }],
    });

    let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Sprite Uniform Bind Group"),
        layout: &uniform_bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let texture_bind_group_layout = texture::create_bind_group_layout(device);

    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Sprite Pipeline Layout"),
        bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
        push_constant_ranges: &[],
    });

    let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Sprite Pipeline"),
        layout: Some(&render_pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vertex_stage.module,
            entry_point: ENTRY_POINT,
            buffers: &[vertex::position_layout(), vertex::uv_layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment_stage.module,
            entry_point: ENTRY_POINT,
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    });

    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        let log = err.to_string();
        error!(
            "Error --> link program ({} + {}):\n{}",
            vertex_stage.path.display(),
            fragment_stage.path.display(),
            log
        );
        return Err(SpriteError::ShaderLink(log));
    }

    info!(
        "Linked shader program ({} + {})",
        vertex_stage.path.display(),
        fragment_stage.path.display()
    );
    Ok(ShaderProgram {
        render_pipeline,
        uniform_bind_group,
        texture_bind_group_layout,
        uniform_buffer,
        uniforms,
    })
}

impl ShaderProgram {
    /// Resolves `name` and uploads `value` into its slot.
    ///
    /// Names that do not resolve are ignored.
    pub fn set_uniform_f32(&mut self, queue: &wgpu::Queue, name: &str, value: f32) {
        match self.uniforms.set(name, value) {
            Some(offset) => {
                queue.write_buffer(&self.uniform_buffer, offset, bytemuck::bytes_of(&value));
            }
            None => trace!("uniform '{}' not found, ignoring", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_kind_names() {
        assert_eq!(ShaderStageKind::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStageKind::Fragment.to_string(), "fragment");
    }

    #[test]
    fn stage_kind_maps_to_naga() {
        assert_eq!(ShaderStageKind::Vertex.naga_stage(), wgpu::naga::ShaderStage::Vertex);
        assert_eq!(ShaderStageKind::Fragment.naga_stage(), wgpu::naga::ShaderStage::Fragment);
    }

    fn parse_and_validate(source: &str, kind: ShaderStageKind) -> wgpu::naga::Module {
        use wgpu::naga::front::glsl::{Frontend, Options};
        use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

        let module = match Frontend::default().parse(&Options::from(kind.naga_stage()), source) {
            Ok(module) => module,
            Err(e) => panic!("{} shader failed to parse: {:?}", kind, e),
        };
        if let Err(e) = Validator::new(ValidationFlags::all(), Capabilities::empty()).validate(&module) {
            panic!("{} shader failed validation: {:?}", kind, e);
        }
        module
    }

    #[test]
    fn shipped_shaders_compile() {
        let vertex = parse_and_validate(
            include_str!("../../../assets/shaders/sprite.vert"),
            ShaderStageKind::Vertex,
        );
        let fragment = parse_and_validate(
            include_str!("../../../assets/shaders/sprite.frag"),
            ShaderStageKind::Fragment,
        );
        assert!(vertex.entry_points.iter().any(|ep| ep.name == ENTRY_POINT));
        assert!(fragment.entry_points.iter().any(|ep| ep.name == ENTRY_POINT));
    }

    #[test]
    fn shader_uniform_block_matches_slots() {
        for source in [
            include_str!("../../../assets/shaders/sprite.vert"),
            include_str!("../../../assets/shaders/sprite.frag"),
        ] {
            for slot in crate::engine::graphics::uniforms::UNIFORM_SLOTS {
                assert!(source.contains(&format!("float {slot};")), "missing uniform {slot}");
            }
        }
    }

    fn block_discards(block: &wgpu::naga::Block) -> bool {
        use wgpu::naga::Statement;

        block.iter().any(|statement| match statement {
            Statement::Kill => true,
            Statement::Block(inner) => block_discards(inner),
            Statement::If { accept, reject, .. } => block_discards(accept) || block_discards(reject),
            _ => false,
        })
    }

    #[test]
    fn fragment_discards_translucent_texels() {
        let source = include_str!("../../../assets/shaders/sprite.frag");
        assert!(source.contains("const float ALPHA_CUTOFF = 0.5;"));
        assert!(source.contains("color.a <= ALPHA_CUTOFF"));

        let module = parse_and_validate(source, ShaderStageKind::Fragment);
        let entry = module
            .entry_points
            .iter()
            .find(|ep| ep.name == ENTRY_POINT)
            .unwrap();
        let main_discards = block_discards(&entry.function.body)
            || module.functions.iter().any(|(_, f)| block_discards(&f.body));
        assert!(main_discards, "fragment shader never discards");

        let vertex = parse_and_validate(
            include_str!("../../../assets/shaders/sprite.vert"),
            ShaderStageKind::Vertex,
        );
        assert!(vertex.entry_points.iter().all(|ep| !block_discards(&ep.function.body)));
    }

    #[test]
    fn compile_error_message_carries_log() {
        let err = SpriteError::ShaderCompile {
            path: "assets/shaders/sprite.vert".into(),
            stage: ShaderStageKind::Vertex,
            log: "0:3: unexpected token".to_owned(),
        };
        let message = err.to_string();
        assert!(message.contains("vertex"));
        assert!(message.contains("unexpected token"));
        assert!(err.is_fatal());
    }
}
