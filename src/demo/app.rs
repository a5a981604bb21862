use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};
use std::sync::Arc;
use log::{debug, error, info, warn};

use crate::config::Config;
use crate::demo::state::{ExitReason, RunState};
use crate::engine::error::Result;
use crate::engine::graphics::context::GraphicsContext;
use crate::engine::graphics::renderer::SpriteRenderer;
use crate::engine::graphics::shader::{self, ShaderProgram, ShaderStageKind};
use crate::engine::graphics::texture::Texture;
use crate::engine::window::{WindowAction, WindowManager};

pub struct App {
    config: Config,
    window_manager: WindowManager,
    context: Option<GraphicsContext>,
    program: Option<ShaderProgram>,
    renderer: Option<SpriteRenderer>,
    state: RunState,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.context.is_some() {
            return;
        }

        let window = self
            .window_manager
            .create_window(event_loop, &self.config.title, self.config.viewport)
            .unwrap_or_else(|_| {
                error!("Failed to create window, exiting");
                std::process::exit(1);
            });

        if let Err(e) = self.init_graphics(window) {
            error!("{}", e);
            std::process::exit(1);
        }
        self.window_manager.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match WindowManager::classify(&event) {
            WindowAction::Close => {
                self.state.request_exit(ExitReason::CloseRequested);
                event_loop.exit();
            }
            WindowAction::Redraw => {
                self.render_frame();
                if self.state.should_exit() {
                    event_loop.exit();
                } else {
                    self.window_manager.request_redraw();
                }
            }
            WindowAction::Resize(physical_size) => {
                if let Some(context) = &mut self.context {
                    context.resize(physical_size);
                }
            }
            WindowAction::Ignore => (),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Renderer and program hold GPU objects; release them before the device.
        self.renderer.take();
        self.program.take();
        self.context.take();
        info!(
            "Exiting after {} frames ({:?})",
            self.state.frame_count,
            self.state.exit_reason()
        );
    }
}

impl App {
    pub fn new(config: Config) -> Self {
        let state = RunState::new(config.max_frames);
        Self {
            config,
            window_manager: WindowManager::new(),
            context: None,
            program: None,
            renderer: None,
            state,
        }
    }

    fn init_graphics(&mut self, window: Arc<Window>) -> Result<()> {
        let context = pollster::block_on(GraphicsContext::new(window, self.config.viewport))?;

        let vertex_stage = shader::compile_stage(
            &context.device,
            &self.config.vertex_shader_path,
            ShaderStageKind::Vertex,
        )?;
        let fragment_stage = shader::compile_stage(
            &context.device,
            &self.config.fragment_shader_path,
            ShaderStageKind::Fragment,
        )?;
        let program = shader::link_program(
            &context.device,
            &vertex_stage,
            &fragment_stage,
            context.format(),
            self.config.viewport,
        )?;

        let texture = Texture::load(
            &context.device,
            &context.queue,
            &program.texture_bind_group_layout,
            &self.config.texture_path,
        )?;
        let renderer = SpriteRenderer::new(&context.device, texture, self.config.viewport);

        self.context = Some(context);
        self.program = Some(program);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn render_frame(&mut self) {
        let (Some(context), Some(program), Some(renderer)) =
            (self.context.as_mut(), self.program.as_mut(), self.renderer.as_mut())
        else {
            return;
        };

        let frame = match context.begin_frame() {
            Ok(frame) => frame,
            Err(e) if !e.is_fatal() => {
                warn!("Skipping frame: {}", e);
                return;
            }
            Err(e) => {
                error!("Render error: {}", e);
                std::process::exit(1);
            }
        };

        renderer.draw(context, &frame, program, &self.config.sprite);
        frame.present();

        if let Some(fps) = self.state.record_frame() {
            debug!("FPS: {}", fps);
        }
    }
}
