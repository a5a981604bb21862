//! Demo application: one sprite, drawn every frame until told to stop.

pub mod app;
pub mod state;

pub use app::App;
pub use state::{ExitReason, RunState};
