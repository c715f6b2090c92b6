//! Editor state and data

use macroquad::math::Vec2;

use crate::game::entity::EntityId;

/// Current editor tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorTool {
    Obstacle,
    Ground,
    Fire,
    Extinguisher,
    HelpText,
    Player,
}

impl EditorTool {
    /// Tools in keyboard order (1-6)
    pub const ALL: [EditorTool; 6] = [
        EditorTool::Obstacle,
        EditorTool::Ground,
        EditorTool::Fire,
        EditorTool::Extinguisher,
        EditorTool::HelpText,
        EditorTool::Player,
    ];

    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::ALL.get(slot).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            EditorTool::Obstacle => "Obstacle",
            EditorTool::Ground => "Ground",
            EditorTool::Fire => "Fire",
            EditorTool::Extinguisher => "Extinguisher",
            EditorTool::HelpText => "Help text",
            EditorTool::Player => "Player",
        }
    }

    /// Rect tools are placed by dragging, the rest with a single click
    pub fn is_rect(&self) -> bool {
        matches!(self, EditorTool::Obstacle | EditorTool::Ground | EditorTool::Fire)
    }
}

/// Mouse drag in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drag {
    /// Dragging out a new rectangle from `start`
    Create { tool: EditorTool, start: Vec2 },
    /// Moving the bottom-right corner of an existing rectangle; `anchor` is
    /// the fixed top-left corner
    Resize { id: EntityId, anchor: Vec2 },
}

#[derive(Debug, Clone)]
pub struct EditorState {
    pub active: bool,
    pub tool: EditorTool,
    pub drag: Option<Drag>,
    /// Help label receiving typed characters
    pub editing_label: Option<EntityId>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            active: false,
            tool: EditorTool::Obstacle,
            drag: None,
            editing_label: None,
        }
    }

    /// Enter or leave edit mode. Leaving drops any unfinished drag and ends
    /// label editing. Returns the new mode.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        if !self.active {
            self.cancel();
        }
        self.active
    }

    pub fn cancel(&mut self) {
        self.drag = None;
        self.editing_label = None;
    }

    pub fn is_typing(&self) -> bool {
        self.active && self.editing_label.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroquad::math::vec2;

    #[test]
    fn test_tool_slots() {
        assert_eq!(EditorTool::from_slot(0), Some(EditorTool::Obstacle));
        assert_eq!(EditorTool::from_slot(5), Some(EditorTool::Player));
        assert_eq!(EditorTool::from_slot(6), None);
        assert!(EditorTool::Fire.is_rect());
        assert!(!EditorTool::HelpText.is_rect());
    }

    #[test]
    fn test_toggle_off_cancels_work() {
        let mut editor = EditorState::new();
        assert!(editor.toggle());
        editor.drag = Some(Drag::Create { tool: EditorTool::Ground, start: vec2(1.0, 2.0) });
        editor.editing_label = Some(EntityId(4));
        assert!(editor.is_typing());

        assert!(!editor.toggle());
        assert!(editor.drag.is_none());
        assert!(editor.editing_label.is_none());
        assert!(!editor.is_typing());
    }
}
