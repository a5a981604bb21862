//! Window creation and event classification.

pub mod manager;

pub use manager::{WindowAction, WindowManager};
