//! Error kinds raised while bringing up and driving the sprite pipeline.

use std::path::PathBuf;

use crate::engine::graphics::shader::ShaderStageKind;

#[derive(Debug, thiserror::Error)]
pub enum SpriteError {
    #[error("failed to initialise graphics context: {0}")]
    ContextInit(String),

    #[error("failed to read shader source {path:?}: {source}")]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile {stage} shader {path:?}:\n{log}")]
    ShaderCompile {
        path: PathBuf,
        stage: ShaderStageKind,
        log: String,
    },

    #[error("failed to link shader program:\n{0}")]
    ShaderLink(String),

    #[error("failed to load texture {path:?}: {source}")]
    AssetLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture has degenerate size {width}x{height}")]
    DegenerateTexture { width: u32, height: u32 },

    #[error("texture size {width}x{height} exceeds device limit {max_dimension}")]
    TextureTooLarge {
        width: u32,
        height: u32,
        max_dimension: u32,
    },

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

impl SpriteError {
    /// Transient surface conditions skip a frame; everything else ends the process.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SpriteError::Surface(
                wgpu::SurfaceError::Lost
                    | wgpu::SurfaceError::Outdated
                    | wgpu::SurfaceError::Timeout
            )
        )
    }
}

pub type Result<T> = std::result::Result<T, SpriteError>;
