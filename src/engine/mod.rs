//! Engine module containing graphics, errors, and window management.

pub mod error;
pub mod graphics;
pub mod window;

// Re-export commonly used types
pub use error::SpriteError;
pub use graphics::{renderer::SpriteRenderer, shader::ShaderProgram, texture::Texture};
