//! Gameplay Screen
//!
//! Owns the world, the editor and the render assets, and handles the keys
//! that work everywhere: Tab toggles the editor, F5/Ctrl+S saves, F9
//! reloads. Once the round ends the world freezes until Enter restarts it
//! from the saved level (or the starter level when nothing was saved).

use std::path::Path;

use macroquad::prelude::*;

use crate::editor::{self, EditorState};
use crate::game::entity::EntityStore;
use crate::game::event::GameEvent;
use crate::game::renderer::{self, RenderAssets};
use crate::game::{Outcome, PlayerControls, World};
use crate::input::FrameInput;
use crate::level;
use crate::settings::Settings;

/// How long a status message stays on screen (seconds)
const STATUS_DURATION: f32 = 2.5;
/// Longest step the simulation takes; slower frames are slowed down instead
/// of letting bodies tunnel through thin obstacles
const MAX_FRAME_TIME: f32 = 1.0 / 20.0;

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Won,
    Lost,
}

struct StatusMessage {
    text: String,
    remaining: f32,
}

pub struct GameplayScreen {
    settings: Settings,
    world: World,
    editor: EditorState,
    assets: RenderAssets,
    status: Option<StatusMessage>,
    ending: Option<Ending>,
    quit: bool,
    mouse: Vec2,
}

/// Level to start with: the saved one if it loads, otherwise the starter level
fn initial_store(path: &Path) -> EntityStore {
    if !path.exists() {
        log::info!("No level at {}, using the starter level", path.display());
        return level::starter_level();
    }
    let mut store = EntityStore::new();
    match level::load_into(&mut store, path) {
        Ok(count) => {
            log::info!("Loaded {} entities from {}", count, path.display());
            store
        }
        Err(e) => {
            log::warn!("Failed to load {}: {}", path.display(), e);
            level::starter_level()
        }
    }
}

impl GameplayScreen {
    /// Load the level and textures named in `settings`
    pub async fn init(settings: Settings) -> Self {
        let store = initial_store(&settings.level_path);

        let texture_path = settings.extinguisher_texture.to_string_lossy().into_owned();
        let extinguisher = match load_texture(&texture_path).await {
            Ok(texture) => Some(texture),
            Err(e) => {
                log::warn!("Extinguisher texture unavailable ({}), drawing shapes", e);
                None
            }
        };

        Self::new(settings, store, RenderAssets { extinguisher })
    }

    pub fn new(settings: Settings, store: EntityStore, assets: RenderAssets) -> Self {
        let world = World::new(store, settings.seed);
        Self {
            settings,
            world,
            editor: EditorState::new(),
            assets,
            status: None,
            ending: None,
            quit: false,
            mouse: Vec2::ZERO,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage { text: text.into(), remaining: STATUS_DURATION });
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn update(&mut self, input: &FrameInput, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_TIME);
        self.mouse = input.mouse.position;

        if let Some(status) = &mut self.status {
            status.remaining -= dt;
            if status.remaining <= 0.0 {
                self.status = None;
            }
        }

        if input.toggle_editor {
            self.toggle_editor();
        }
        if input.save {
            self.save();
        }
        if input.reload {
            self.reload();
        }

        if self.ending.is_some() {
            if input.enter {
                self.restart();
            } else if input.escape {
                self.quit = true;
            }
            return;
        }

        if self.editor.active {
            let outcome = editor::apply(&mut self.editor, &mut self.world.store, input);
            if let Some(text) = outcome.status {
                self.set_status(text);
            }
        }

        let play_input = if self.editor.is_typing() {
            input.without_gameplay_keys()
        } else {
            input.clone()
        };
        let controls = PlayerControls::from_input(&play_input, self.editor.active);
        self.world.step(&controls, dt, &self.settings, !self.editor.active);

        let mut latest = None;
        for event in self.world.events.drain() {
            match event {
                GameEvent::Burned { .. } => log::trace!("{:?}", event),
                _ => log::info!("{:?}", event),
            }
            if let Some(text) = event.status_text() {
                latest = Some(text);
            }
        }
        if let Some(text) = latest {
            self.set_status(text);
        }

        if !self.editor.active {
            self.ending = match self.world.outcome() {
                Outcome::Running => None,
                Outcome::Won => Some(Ending::Won),
                Outcome::Lost => Some(Ending::Lost),
            };
            if let Some(ending) = self.ending {
                log::info!("Round over: {:?}", ending);
            }
        }
    }

    fn toggle_editor(&mut self) {
        if self.editor.toggle() {
            self.set_status("Editor on");
        } else {
            // The level may have gained or lost fires
            self.world.rebaseline();
            self.set_status("Editor off");
        }
    }

    fn save(&mut self) {
        let path = self.settings.level_path.clone();
        match level::save_level(&self.world.store, &path) {
            Ok(()) => {
                log::info!("Saved {} entities to {}", self.world.store.len(), path.display());
                self.set_status(format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to save {}: {}", path.display(), e);
                self.set_status(format!("Save failed: {}", e));
            }
        }
    }

    fn reload(&mut self) {
        let path = self.settings.level_path.clone();
        match level::load_into(&mut self.world.store, &path) {
            Ok(count) => {
                log::info!("Reloaded {} entities from {}", count, path.display());
                self.after_level_change();
                self.set_status(format!("Loaded {}", path.display()));
            }
            Err(e) => {
                log::warn!("Failed to reload {}: {}", path.display(), e);
                self.set_status(format!("Load failed: {}", e));
            }
        }
    }

    fn restart(&mut self) {
        let path = self.settings.level_path.clone();
        let loaded = path.exists() && level::load_into(&mut self.world.store, &path).is_ok();
        if !loaded {
            let starter = level::starter_level();
            if let Err(e) = self.world.store.replace_all(starter.as_slice().to_vec()) {
                log::error!("Failed to restore the starter level: {}", e);
            }
        }
        self.after_level_change();
        self.set_status("Restarted");
    }

    fn after_level_change(&mut self) {
        self.editor.cancel();
        self.world.particles.clear();
        self.world.events.clear();
        self.world.rebaseline();
        self.ending = None;
    }

    pub fn draw(&self) {
        renderer::draw_world(&self.world.store, &self.world.particles, &self.assets, &self.settings);
        editor::draw_overlay(&self.editor, &self.world.store, self.mouse);

        if let Some(status) = &self.status {
            let alpha = (status.remaining / 0.5).clamp(0.0, 1.0);
            draw_text(&status.text, 10.0, screen_height() - 34.0, 20.0, Color::new(1.0, 1.0, 1.0, alpha));
        }

        if let Some(ending) = self.ending {
            let (title, color) = match ending {
                Ending::Won => ("All fires are out!", GREEN),
                Ending::Lost => ("You burned out", RED),
            };
            let (sw, sh) = (screen_width(), screen_height());
            draw_rectangle(0.0, 0.0, sw, sh, Color::new(0.0, 0.0, 0.0, 0.6));
            let dims = measure_text(title, None, 40, 1.0);
            draw_text(title, (sw - dims.width) * 0.5, sh * 0.5, 40.0, color);
            let hint = "Enter to play again, Escape to quit";
            let dims = measure_text(hint, None, 20, 1.0);
            draw_text(hint, (sw - dims.width) * 0.5, sh * 0.5 + 36.0, 20.0, WHITE);
        }
    }

    /// Release GPU resources
    pub fn unload(&mut self) {
        self.assets.extinguisher = None;
        log::info!("Gameplay screen unloaded");
    }

    /// How the round ended, if it has
    pub fn finish(&self) -> Option<Ending> {
        self.ending
    }
}
