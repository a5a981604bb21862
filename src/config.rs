//! Static configuration: window, asset paths and the demo draw.

use std::num::NonZeroU64;
use std::path::PathBuf;

use glam::Vec3;
use log::warn;

use crate::engine::graphics::rect::{Rect, Viewport};
use crate::engine::graphics::renderer::DrawRequest;

pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 720;
pub const WINDOW_TITLE: &str = "test";

pub const TEXTURE_PATH: &str = "./assets/title.png";
pub const VERTEX_SHADER_PATH: &str = "./assets/shaders/sprite.vert";
pub const FRAGMENT_SHADER_PATH: &str = "./assets/shaders/sprite.frag";

/// Stops the render loop after this many presented frames. Must be positive.
pub const MAX_FRAMES_ENV: &str = "SPRITE_GUI_MAX_FRAMES";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub viewport: Viewport,
    pub title: String,
    pub texture_path: PathBuf,
    pub vertex_shader_path: PathBuf,
    pub fragment_shader_path: PathBuf,
    pub sprite: DrawRequest,
    pub max_frames: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            title: WINDOW_TITLE.to_owned(),
            texture_path: PathBuf::from(TEXTURE_PATH),
            vertex_shader_path: PathBuf::from(VERTEX_SHADER_PATH),
            fragment_shader_path: PathBuf::from(FRAGMENT_SHADER_PATH),
            sprite: DrawRequest::new(1.0)
                .with_dest(Rect::new(-393.0, 256.0, 786.0, 255.0))
                .with_offset(Vec3::ZERO),
            max_frames: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(MAX_FRAMES_ENV) {
            match raw.trim().parse::<NonZeroU64>() {
                Ok(frames) => config.max_frames = Some(frames.get()),
                Err(e) => warn!("Ignoring {}={:?}: {}", MAX_FRAMES_ENV, raw, e),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_window_constants() {
        let config = Config::default();
        assert_eq!(config.viewport, Viewport::new(1280, 720));
        assert_eq!(config.sprite.dest, Some(Rect::new(-393.0, 256.0, 786.0, 255.0)));
        assert_eq!(config.sprite.source, None);
        assert_eq!(config.max_frames, None);
    }

    #[test]
    fn frame_limit_from_env() {
        let config = Config::from_lookup(|key| (key == MAX_FRAMES_ENV).then(|| " 120 ".to_owned()));
        assert_eq!(config.max_frames, Some(120));
    }

    #[test]
    fn invalid_frame_limit_is_ignored() {
        let config = Config::from_lookup(|_| Some("forever".to_owned()));
        assert_eq!(config.max_frames, None);
    }

    #[test]
    fn zero_frame_limit_is_rejected() {
        let config = Config::from_lookup(|_| Some("0".to_owned()));
        assert_eq!(config.max_frames, None);
        assert!(!crate::demo::state::RunState::new(config.max_frames).should_exit());
    }
}
