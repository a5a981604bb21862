//! Window management implementation.

use std::sync::Arc;

use log::error;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::engine::graphics::rect::Viewport;

/// What the render loop should do in response to a window event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    Close,
    Redraw,
    Resize(winit::dpi::PhysicalSize<u32>),
    Ignore,
}

pub struct WindowManager {
    pub window: Option<Arc<Window>>,
}

impl WindowManager {
    pub fn new() -> Self {
        Self { window: None }
    }

    /// Creates a fixed-size window matching the viewport.
    pub fn create_window(
        &mut self,
        event_loop: &ActiveEventLoop,
        title: &str,
        viewport: Viewport,
    ) -> Result<Arc<Window>, winit::error::OsError> {
        let attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(winit::dpi::PhysicalSize::new(viewport.width, viewport.height))
            .with_resizable(false);
        let window = event_loop.create_window(attributes).map_err(|e| {
            error!("Failed to create window: {:?}", e);
            e
        })?;

        let window = Arc::new(window);
        self.window = Some(window.clone());
        Ok(window)
    }

    pub fn classify(event: &WindowEvent) -> WindowAction {
        match event {
            WindowEvent::CloseRequested => WindowAction::Close,
            WindowEvent::KeyboardInput { event, .. }
                if event.state == winit::event::ElementState::Pressed
                    && event.physical_key
                        == winit::keyboard::PhysicalKey::Code(winit::keyboard::KeyCode::Escape) =>
            {
                WindowAction::Close
            }
            WindowEvent::RedrawRequested => WindowAction::Redraw,
            WindowEvent::Resized(physical_size) => WindowAction::Resize(*physical_size),
            _ => WindowAction::Ignore,
        }
    }

    pub fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_and_redraw_are_classified() {
        assert_eq!(WindowManager::classify(&WindowEvent::CloseRequested), WindowAction::Close);
        assert_eq!(WindowManager::classify(&WindowEvent::RedrawRequested), WindowAction::Redraw);
        assert_eq!(WindowManager::classify(&WindowEvent::Focused(true)), WindowAction::Ignore);
    }

    #[test]
    fn resize_carries_size() {
        let size = winit::dpi::PhysicalSize::new(800, 600);
        assert_eq!(
            WindowManager::classify(&WindowEvent::Resized(size)),
            WindowAction::Resize(size)
        );
    }
}
