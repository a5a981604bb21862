//! Application entry point.

use winit::event_loop::{ControlFlow, EventLoop};
use log::{info, error};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    info!("Logger initialized");

    let event_loop = EventLoop::new().map_err(|e| {
        error!("Failed to create event loop: {:?}", e);
        e
    })?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let config = sprite_gui::Config::from_env();
    info!(
        "Sprite viewport {}x{} \"{}\", frame limit: {}",
        config.viewport.width,
        config.viewport.height,
        config.title,
        config
            .max_frames
            .map_or_else(|| "none".to_owned(), |n| n.to_string())
    );

    let mut app = sprite_gui::App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("Application error: {:?}", e);
        return Err(Box::new(e));
    }

    Ok(())
}
