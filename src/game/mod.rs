//! Game Module
//!
//! Everything that runs during play:
//! - Entity store: the flat list of level records
//! - Physics: circle-vs-rectangle correction with velocity reflection
//! - Particles: ring buffer of embers and retardant spray
//! - Fire: growth, spreading, burn damage and dousing
//! - World: one simulation step over all of the above
//!
//! The world never touches macroquad's input or window state; the renderer
//! is the only part that draws.

pub mod geometry;
pub mod entity;
pub mod components;
pub mod collision;
pub mod particles;
pub mod fire;
pub mod event;
pub mod world;
pub mod renderer;

pub use entity::{Entity, EntityId, EntityKind, EntityStore};
pub use world::{Outcome, PlayerControls, World};
