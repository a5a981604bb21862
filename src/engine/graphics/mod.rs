pub mod context;
pub mod rect;
pub mod renderer;
pub mod shader;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use context::{Frame, GraphicsContext};
pub use rect::{Rect, Viewport};
pub use renderer::{DrawRequest, SpriteRenderer};
pub use shader::{ShaderProgram, ShaderStage, ShaderStageKind};
pub use texture::{Texture, TextureSize};
pub use vertex::QuadGeometry;
