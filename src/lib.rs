pub mod app;
pub mod asset;
pub mod error;
pub mod renderer;
pub mod scene;
pub mod settings;

pub use app::{App, GameLogic, Input, SetupContext, UpdateContext};
pub use error::{RenderError, Result};

use winit::event_loop::EventLoop;

pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}

/// Opens a window and drives `game` until the window closes.
pub fn run<G: GameLogic>(game: G) -> std::result::Result<(), winit::error::EventLoopError> {
    init_logging();

    log::info!("Starting skyshade");

    let settings = settings::RenderSettings::load();
    let event_loop = EventLoop::new()?;
    let mut app = App::new(game, settings);

    let result = event_loop.run_app(&mut app);

    if let Err(ref err) = result {
        log::error!("Application error: {}", err);
    }

    log::info!("Application shutdown complete");

    result
}
