//! Level Editor
//!
//! An in-game editor toggled with Tab. It edits the live entity store directly:
//! - state: current tool, drag in progress, label being typed
//! - actions: input to store edits (create, resize, delete, place, type)
//! - overlay: banner, tool list, drag preview and handles

mod state;
mod actions;
mod overlay;

pub use state::*;
pub use actions::*;
pub use overlay::*;
