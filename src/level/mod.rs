//! Level data
//!
//! A level is simply the full list of entity records. Files carry a format
//! version so an old file is rejected with a clear message instead of being
//! misread.

mod io;

pub use io::*;

use macroquad::math::vec2;
use serde::{Deserialize, Serialize};

use crate::game::entity::{Entity, EntityKind, EntityStore, ExtinguisherBody, FireZone, HelpLabel, PlayerBody};
use crate::game::geometry::Bounds;

/// Current level file version
pub const LEVEL_VERSION: u32 = 1;

/// On-disk representation of a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelFile {
    pub version: u32,
    pub entities: Vec<Entity>,
}

impl LevelFile {
    /// Snapshot the store for saving
    pub fn from_store(store: &EntityStore) -> Self {
        Self {
            version: LEVEL_VERSION,
            entities: store.as_slice().to_vec(),
        }
    }
}

/// The level used when no saved level exists yet.
///
/// Starts from the two obstacles of the first prototype and adds a floor, the
/// player, one extinguisher, a pair of fires and a few hints.
pub fn starter_level() -> EntityStore {
    let mut store = EntityStore::new();
    let kinds = [
        EntityKind::Ground(Bounds::new(20.0, 60.0, 760.0, 520.0)),
        EntityKind::Obstacle(Bounds::new(400.0, 400.0, 100.0, 200.0)),
        EntityKind::Obstacle(Bounds::new(100.0, 400.0, 100.0, 200.0)),
        EntityKind::Player(PlayerBody::at(vec2(200.0, 300.0))),
        EntityKind::Extinguisher(ExtinguisherBody::at(vec2(100.0, 140.0))),
        EntityKind::Fire(FireZone::new(Bounds::new(560.0, 160.0, 60.0, 60.0), 0.6)),
        EntityKind::Fire(FireZone::new(Bounds::new(260.0, 500.0, 60.0, 60.0), 0.4)),
        EntityKind::HelpText(HelpLabel::new(vec2(40.0, 100.0), "WASD to move, walk over the extinguisher")),
        EntityKind::HelpText(HelpLabel::new(vec2(420.0, 100.0), "Hold mouse or Space to spray, Q to drop")),
        EntityKind::HelpText(HelpLabel::new(vec2(40.0, 570.0), "Tab opens the editor")),
    ];
    for kind in kinds {
        let name = kind.name();
        if let Err(e) = store.spawn(kind) {
            log::error!("Starter level is missing a {}: {}", name, e);
        }
    }
    store
}
