//! Extinguish: a small 2D fire-fighting game with a built-in level editor
//!
//! Walk over the extinguisher to pick it up, spray the fires out before they
//! spread and don't step off the ground. Tab switches to the editor, where
//! the level can be reshaped with the mouse and saved with F5.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod settings;
mod input;
mod screen;
mod game;
mod level;
mod editor;

use macroquad::prelude::*;
use input::FrameInput;
use screen::GameplayScreen;
use settings::Settings;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Extinguish v{}", VERSION),
        window_width: 800,
        window_height: 600,
        window_resizable: false,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    {
        crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    log::info!("Extinguish v{}", VERSION);

    let settings = Settings::load();
    let mut screen = GameplayScreen::init(settings).await;

    while !screen.should_quit() {
        let input = FrameInput::capture();
        screen.update(&input, get_frame_time());
        screen.draw();
        next_frame().await;
    }

    if let Some(ending) = screen.finish() {
        log::info!("Last round: {:?}", ending);
    }
    screen.unload();
}
