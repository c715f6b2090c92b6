//! Fire behaviour
//!
//! Fire zones grow toward full intensity, hurt a player standing in them,
//! spread to neighbouring tiles once fully ablaze, and shrink when doused with
//! retardant. The functions here are pure; `World::step` decides when to call
//! them and applies the results to the store.

use macroquad::math::{vec2, Vec2};
use rand::Rng;

use super::entity::FireZone;
use super::geometry::Bounds;

/// Directions a fire may spread in, tried in random order
const SPREAD_DIRECTIONS: [Vec2; 4] = [
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, -1.0),
];

/// Intensity a freshly spread fire starts with
pub const SPREAD_START_INTENSITY: f32 = 0.25;

/// Raise intensity toward 1
pub fn grow(zone: &mut FireZone, delta_time: f32, rate: f32) {
    zone.intensity = (zone.intensity + rate * delta_time).clamp(0.0, 1.0);
}

/// Lower intensity. Returns true if the fire went out.
pub fn douse(zone: &mut FireZone, amount: f32) -> bool {
    zone.intensity = (zone.intensity - amount.max(0.0)).max(0.0);
    zone.intensity <= 0.0
}

/// Damage dealt to a player inside a zone this frame
pub fn burn_damage(intensity: f32, delta_time: f32, rate: f32) -> f32 {
    intensity.clamp(0.0, 1.0) * rate * delta_time
}

/// Advance the spread timer. Returns true when a spread attempt is due.
///
/// Only fully burning zones accumulate time; the timer resets on every attempt.
pub fn tick_spread(zone: &mut FireZone, delta_time: f32, interval: f32) -> bool {
    if zone.intensity < 1.0 {
        zone.spread_timer = 0.0;
        return false;
    }
    zone.spread_timer += delta_time;
    if zone.spread_timer >= interval {
        zone.spread_timer = 0.0;
        return true;
    }
    false
}

/// What a new fire may not be placed on
pub struct SpreadBlockers<'a> {
    pub obstacles: &'a [Bounds],
    pub fires: &'a [Bounds],
    /// Walkable tiles; empty means the whole level counts as ground
    pub grounds: &'a [Bounds],
}

impl SpreadBlockers<'_> {
    fn allows(&self, candidate: &Bounds) -> bool {
        if self.obstacles.iter().any(|o| o.intersects(candidate)) {
            return false;
        }
        if self.fires.iter().any(|f| f.intersects(candidate)) {
            return false;
        }
        self.grounds.is_empty() || self.grounds.iter().any(|g| g.contains(candidate.center()))
    }
}

/// Pick a free neighbouring tile of the same size, if any
pub fn spread_candidate<R: Rng>(zone: &FireZone, blockers: &SpreadBlockers<'_>, rng: &mut R) -> Option<Bounds> {
    let b = zone.bounds;
    let start = rng.gen_range(0..SPREAD_DIRECTIONS.len());
    (0..SPREAD_DIRECTIONS.len())
        .map(|i| SPREAD_DIRECTIONS[(start + i) % SPREAD_DIRECTIONS.len()])
        .map(|dir| b.translated(vec2(dir.x * b.w, dir.y * b.h)))
        .find(|candidate| blockers.allows(candidate))
}
