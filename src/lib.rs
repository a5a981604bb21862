//! Library entry point for the sprite renderer.

pub mod config;
pub mod demo;
pub mod engine;

// Re-export main types for convenience
pub use config::Config;
pub use demo::App;
pub use engine::graphics::{DrawRequest, Rect, SpriteRenderer};
