//! Gameplay events
//!
//! The simulation step reports what happened during a frame as events instead
//! of calling into the screen or the logger directly. The screen drains the
//! queue once per frame to log the events and show status messages.

use super::entity::EntityId;

/// Events raised during one step, in the order they happened
#[derive(Debug)]
pub struct EventQueue<T>(Vec<T>);

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn send(&mut self, event: T) {
        self.0.push(event);
    }

    /// Pending events, without removing them
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    /// Take every pending event, leaving the queue empty
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.0.drain(..)
    }

    /// Forget pending events, e.g. after the level is replaced
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Something noteworthy that happened in a simulation step
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Player grabbed an extinguisher
    PickedUp(EntityId),
    /// Player let go of an extinguisher
    Dropped(EntityId),
    /// The held extinguisher ran out while spraying
    ChargeEmpty(EntityId),
    /// A fire zone reached zero intensity and was removed
    Extinguished(EntityId),
    /// A fire spread into a new zone
    Spread { from: EntityId, to: EntityId },
    /// Fire damage taken this frame
    Burned { amount: f32 },
    /// Player left the ground and was sent back to spawn
    Fell,
    /// Health hit zero
    Died,
}

impl GameEvent {
    /// Short text for the status line, if the event is worth showing
    pub fn status_text(&self) -> Option<String> {
        match self {
            GameEvent::PickedUp(_) => Some("Picked up extinguisher".to_string()),
            GameEvent::Dropped(_) => Some("Dropped extinguisher".to_string()),
            GameEvent::ChargeEmpty(_) => Some("Extinguisher is empty".to_string()),
            GameEvent::Extinguished(id) => Some(format!("Fire {} is out", id)),
            GameEvent::Spread { .. } => Some("The fire is spreading!".to_string()),
            GameEvent::Fell => Some("You fell! Back to the start".to_string()),
            GameEvent::Died => Some("You burned out".to_string()),
            GameEvent::Burned { .. } => None,
        }
    }
}

pub type GameEvents = EventQueue<GameEvent>;
