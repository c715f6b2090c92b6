//! Entity Store
//!
//! Every object in a level is one `Entity`: a unique id plus a tagged record
//! (`EntityKind`). The store is a flat, insertion-ordered list with a fixed
//! capacity. Lookups and deletes are linear scans; with at most a hundred
//! records that is cheaper than any index.
//!
//! Ids come from a monotonically increasing counter that is never reset
//! during a session, so an id seen once is never handed out again, even
//! across level reloads.

use std::fmt;

use macroquad::math::Vec2;
use serde::{Deserialize, Serialize};

use super::components::{Charge, Health};
use super::geometry::{serde_vec2, Bounds};

/// Default store capacity (matches the size of the original entity array)
pub const MAX_ENTITIES: usize = 100;

/// Unique identifier of an entity within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Entity records
// =============================================================================

/// The player body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    #[serde(with = "serde_vec2")]
    pub position: Vec2,
    #[serde(with = "serde_vec2")]
    pub velocity: Vec2,
    /// Where the player reappears after falling off the ground
    #[serde(with = "serde_vec2")]
    pub spawn: Vec2,
    pub health: Health,
    /// Id of the extinguisher being carried
    #[serde(default)]
    pub holding: Option<EntityId>,
}

impl PlayerBody {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            spawn: position,
            health: Health::full(),
            holding: None,
        }
    }
}

/// A fire extinguisher pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtinguisherBody {
    #[serde(with = "serde_vec2")]
    pub position: Vec2,
    #[serde(with = "serde_vec2")]
    pub velocity: Vec2,
    pub charge: Charge,
    /// Carried by the player (follows them instead of simulating freely)
    #[serde(default)]
    pub held: bool,
}

impl ExtinguisherBody {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            charge: Charge::full(),
            held: false,
        }
    }
}

/// A burning area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireZone {
    pub bounds: Bounds,
    /// 0 = out, 1 = fully ablaze
    pub intensity: f32,
    /// Seconds accumulated toward the next spread attempt
    #[serde(default)]
    pub spread_timer: f32,
}

impl FireZone {
    pub fn new(bounds: Bounds, intensity: f32) -> Self {
        Self {
            bounds,
            intensity: intensity.clamp(0.0, 1.0),
            spread_timer: 0.0,
        }
    }
}

/// An editable help label drawn in the level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelpLabel {
    #[serde(with = "serde_vec2")]
    pub position: Vec2,
    pub text: String,
    pub font_size: u16,
}

impl HelpLabel {
    pub const DEFAULT_FONT_SIZE: u16 = 20;

    pub fn new(position: Vec2, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
        }
    }

    /// Rough hit box used for picking labels in the editor
    pub fn approx_bounds(&self) -> Bounds {
        let size = self.font_size as f32;
        let width = (self.text.chars().count().max(1) as f32) * size * 0.5;
        // Text is drawn with its baseline at `position`
        Bounds::new(self.position.x, self.position.y - size, width, size)
    }
}

/// Discriminated record stored for each entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Player(PlayerBody),
    Obstacle(Bounds),
    Ground(Bounds),
    Extinguisher(ExtinguisherBody),
    Fire(FireZone),
    HelpText(HelpLabel),
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Player(_) => "Player",
            EntityKind::Obstacle(_) => "Obstacle",
            EntityKind::Ground(_) => "Ground",
            EntityKind::Extinguisher(_) => "Extinguisher",
            EntityKind::Fire(_) => "Fire",
            EntityKind::HelpText(_) => "HelpText",
        }
    }

    /// Rectangle of the rect-shaped variants
    pub fn bounds(&self) -> Option<&Bounds> {
        match self {
            EntityKind::Obstacle(b) | EntityKind::Ground(b) => Some(b),
            EntityKind::Fire(f) => Some(&f.bounds),
            _ => None,
        }
    }

    pub fn bounds_mut(&mut self) -> Option<&mut Bounds> {
        match self {
            EntityKind::Obstacle(b) | EntityKind::Ground(b) => Some(b),
            EntityKind::Fire(f) => Some(&mut f.bounds),
            _ => None,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, EntityKind::Player(_))
    }
}

/// One record in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
}

// =============================================================================
// Store
// =============================================================================

/// Errors from store mutations
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No free slot left
    Full { capacity: usize },
    /// Two records in a batch share an id
    DuplicateId(EntityId),
    /// The id counter reached `u32::MAX`
    IdsExhausted,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Full { capacity } => write!(f, "entity limit reached ({})", capacity),
            StoreError::DuplicateId(id) => write!(f, "duplicate entity id {}", id),
            StoreError::IdsExhausted => write!(f, "no entity ids left"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Fixed-capacity, insertion-ordered entity list
#[derive(Debug, Clone)]
pub struct EntityStore {
    entities: Vec<Entity>,
    capacity: usize,
    next_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTITIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: Vec::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Add a record and return its freshly assigned id
    pub fn spawn(&mut self, kind: EntityKind) -> Result<EntityId, StoreError> {
        if self.is_full() {
            return Err(StoreError::Full { capacity: self.capacity });
        }
        let next = self.next_id.checked_add(1).ok_or(StoreError::IdsExhausted)?;
        let id = EntityId(self.next_id);
        self.next_id = next;
        self.entities.push(Entity { id, kind });
        Ok(id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn position_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    /// Remove one entity, keeping the order of the rest
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.position_of(id)?;
        Some(self.entities.remove(index))
    }

    /// Remove every entity matching `pred`. Returns how many were removed.
    pub fn remove_where<F: FnMut(&Entity) -> bool>(&mut self, mut pred: F) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| !pred(e));
        before - self.entities.len()
    }

    /// Replace all records with a loaded set.
    ///
    /// Loaded ids are kept as-is. The id counter only moves forward, so ids
    /// spawned afterwards never collide with loaded or previously used ones.
    pub fn replace_all(&mut self, entities: Vec<Entity>) -> Result<(), StoreError> {
        if entities.len() > self.capacity {
            return Err(StoreError::Full { capacity: self.capacity });
        }
        let mut ids: Vec<EntityId> = entities.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(StoreError::DuplicateId(pair[0]));
        }
        if let Some(max) = ids.last() {
            let after = max.0.checked_add(1).ok_or(StoreError::IdsExhausted)?;
            self.next_id = self.next_id.max(after);
        }
        self.entities = entities;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entities.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Id the next `spawn` will hand out
    pub fn next_id(&self) -> EntityId {
        EntityId(self.next_id)
    }

    // =========================================================================
    // Typed helpers
    // =========================================================================

    pub fn player(&self) -> Option<(EntityId, &PlayerBody)> {
        self.entities.iter().find_map(|e| match &e.kind {
            EntityKind::Player(p) => Some((e.id, p)),
            _ => None,
        })
    }

    pub fn player_mut(&mut self) -> Option<(EntityId, &mut PlayerBody)> {
        self.entities.iter_mut().find_map(|e| match &mut e.kind {
            EntityKind::Player(p) => Some((e.id, p)),
            _ => None,
        })
    }

    /// Rectangles of every obstacle, in store order
    pub fn obstacles(&self) -> Vec<Bounds> {
        self.entities
            .iter()
            .filter_map(|e| match &e.kind {
                EntityKind::Obstacle(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    /// Rectangles of every ground tile, in store order
    pub fn grounds(&self) -> Vec<Bounds> {
        self.entities
            .iter()
            .filter_map(|e| match &e.kind {
                EntityKind::Ground(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    /// Rectangles of every fire zone, in store order
    pub fn fires(&self) -> Vec<Bounds> {
        self.entities
            .iter()
            .filter_map(|e| match &e.kind {
                EntityKind::Fire(zone) => Some(zone.bounds),
                _ => None,
            })
            .collect()
    }

    pub fn count_fires(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Fire(_)))
            .count()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
