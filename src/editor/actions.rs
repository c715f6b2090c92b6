//! Editor Actions
//!
//! Turns one frame of mouse/keyboard input into edits of the entity store:
//! - Left drag with a rect tool creates an obstacle, ground or fire
//! - Left click with a point tool places an extinguisher, label or the player
//! - Left drag on a rectangle's bottom-right handle resizes it
//! - Right button held deletes whatever is under the mouse (never the player)
//! - Typed characters go to the label being edited

use macroquad::math::{vec2, Vec2};

use super::state::{Drag, EditorState, EditorTool};
use crate::game::entity::{
    EntityId, EntityKind, EntityStore, ExtinguisherBody, FireZone, HelpLabel, PlayerBody,
};
use crate::game::collision::point_in_any;
use crate::game::geometry::Bounds;
use crate::input::FrameInput;
use crate::level::limits::MAX_LABEL_LEN;

/// Smallest width/height of a created or resized rectangle
pub const MIN_RECT_SIZE: f32 = 8.0;
/// Side of the square resize handle drawn on a rectangle's bottom-right corner
pub const HANDLE_SIZE: f32 = 10.0;
/// Click distance for picking point entities
pub const PICK_RADIUS: f32 = 16.0;
/// Intensity of a fire drawn in the editor
pub const NEW_FIRE_INTENSITY: f32 = 0.5;

/// What one editor frame did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorOutcome {
    /// The store was modified
    pub changed: bool,
    /// Message for the status line
    pub status: Option<String>,
}

impl EditorOutcome {
    fn changed() -> Self {
        Self { changed: true, status: None }
    }

    fn status(message: impl Into<String>) -> Self {
        Self { changed: false, status: Some(message.into()) }
    }

    fn merge(&mut self, other: EditorOutcome) {
        self.changed |= other.changed;
        if other.status.is_some() {
            self.status = other.status;
        }
    }
}

/// Resize handle of a rectangle
pub fn handle_bounds(rect: &Bounds) -> Bounds {
    let corner = rect.bottom_right();
    Bounds::new(corner.x - HANDLE_SIZE * 0.5, corner.y - HANDLE_SIZE * 0.5, HANDLE_SIZE, HANDLE_SIZE)
}

/// Rectangle spanned by a resize drag, never smaller than `MIN_RECT_SIZE`
pub fn resized(anchor: Vec2, mouse: Vec2) -> Bounds {
    let size = (mouse - anchor).max(vec2(MIN_RECT_SIZE, MIN_RECT_SIZE));
    Bounds::new(anchor.x, anchor.y, size.x, size.y)
}

/// Whether the entity is under `point` for picking
pub fn hit_test(kind: &EntityKind, point: Vec2) -> bool {
    match kind {
        EntityKind::Obstacle(b) | EntityKind::Ground(b) => b.contains(point),
        EntityKind::Fire(zone) => zone.bounds.contains(point),
        EntityKind::Extinguisher(ext) => ext.position.distance(point) <= PICK_RADIUS,
        EntityKind::Player(p) => p.position.distance(point) <= PICK_RADIUS,
        EntityKind::HelpText(label) => label.approx_bounds().contains(point),
    }
}

/// Apply one frame of editor input to the store
pub fn apply(editor: &mut EditorState, store: &mut EntityStore, input: &FrameInput) -> EditorOutcome {
    let mut outcome = EditorOutcome::default();
    if !editor.active {
        return outcome;
    }

    if editor.editing_label.is_some() {
        outcome.merge(edit_label(editor, store, input));
    } else if let Some(tool) = input.tool_slot.and_then(EditorTool::from_slot) {
        editor.tool = tool;
        outcome.merge(EditorOutcome::status(format!("Tool: {}", tool.label())));
    }

    let mouse = input.mouse;

    if mouse.left_pressed && editor.drag.is_none() {
        // Clicking anywhere ends label editing first
        if editor.editing_label.is_some() {
            outcome.merge(finish_label(editor, store));
        }
        outcome.merge(press(editor, store, mouse.position));
    }

    if let Some(Drag::Resize { id, anchor }) = editor.drag {
        if mouse.left_down || mouse.left_released {
            if let Some(bounds) = store.get_mut(id).and_then(|e| e.kind.bounds_mut()) {
                let next = resized(anchor, mouse.position);
                if *bounds != next {
                    *bounds = next;
                    outcome.changed = true;
                }
            }
        }
    }

    if mouse.left_released {
        if let Some(Drag::Create { tool, start }) = editor.drag.take() {
            outcome.merge(commit_rect(store, tool, start, mouse.position));
        }
    }

    if mouse.right_down && editor.drag.is_none() {
        outcome.merge(delete_at(editor, store, mouse.position));
    }

    outcome
}

fn press(editor: &mut EditorState, store: &mut EntityStore, point: Vec2) -> EditorOutcome {
    // Topmost (last drawn) rectangle wins
    let handle = store
        .as_slice()
        .iter()
        .rev()
        .find_map(|e| e.kind.bounds().filter(|b| handle_bounds(b).contains(point)).map(|b| (e.id, *b)));
    if let Some((id, rect)) = handle {
        editor.drag = Some(Drag::Resize { id, anchor: rect.top_left() });
        return EditorOutcome::default();
    }

    if editor.tool.is_rect() {
        editor.drag = Some(Drag::Create { tool: editor.tool, start: point });
        return EditorOutcome::default();
    }

    place(editor, store, point)
}

fn rect_kind(tool: EditorTool, bounds: Bounds) -> Option<EntityKind> {
    match tool {
        EditorTool::Obstacle => Some(EntityKind::Obstacle(bounds)),
        EditorTool::Ground => Some(EntityKind::Ground(bounds)),
        EditorTool::Fire => Some(EntityKind::Fire(FireZone::new(bounds, NEW_FIRE_INTENSITY))),
        _ => None,
    }
}

fn commit_rect(store: &mut EntityStore, tool: EditorTool, start: Vec2, end: Vec2) -> EditorOutcome {
    let bounds = Bounds::from_corners(start, end);
    if bounds.w < MIN_RECT_SIZE || bounds.h < MIN_RECT_SIZE {
        return EditorOutcome::default();
    }
    let Some(kind) = rect_kind(tool, bounds) else {
        return EditorOutcome::default();
    };
    match store.spawn(kind) {
        Ok(id) => {
            log::debug!("created {} {} at {:?}", tool.label(), id, bounds);
            EditorOutcome::changed()
        }
        Err(e) => EditorOutcome::status(format!("Can't add {}: {}", tool.label(), e)),
    }
}

/// Place a point entity. The player is unique, so placing it again moves it.
fn place(editor: &mut EditorState, store: &mut EntityStore, point: Vec2) -> EditorOutcome {
    match editor.tool {
        EditorTool::Player => {
            let grounds = store.grounds();
            if !grounds.is_empty() && !point_in_any(point, &grounds) {
                return EditorOutcome::status("The player has to start on ground");
            }
            if let Some((_, player)) = store.player_mut() {
                player.position = point;
                player.spawn = point;
                player.velocity = Vec2::ZERO;
                return EditorOutcome::changed();
            }
            spawn_point(store, EntityKind::Player(PlayerBody::at(point)))
        }
        EditorTool::Extinguisher => spawn_point(store, EntityKind::Extinguisher(ExtinguisherBody::at(point))),
        EditorTool::HelpText => {
            // Clicking an existing label edits it
            let existing = store
                .as_slice()
                .iter()
                .rev()
                .find(|e| matches!(e.kind, EntityKind::HelpText(_)) && hit_test(&e.kind, point))
                .map(|e| e.id);
            if let Some(id) = existing {
                editor.editing_label = Some(id);
                return EditorOutcome::default();
            }
            match store.spawn(EntityKind::HelpText(HelpLabel::new(point, ""))) {
                Ok(id) => {
                    editor.editing_label = Some(id);
                    EditorOutcome::changed()
                }
                Err(e) => EditorOutcome::status(format!("Can't add label: {}", e)),
            }
        }
        EditorTool::Obstacle | EditorTool::Ground | EditorTool::Fire => EditorOutcome::default(),
    }
}

fn spawn_point(store: &mut EntityStore, kind: EntityKind) -> EditorOutcome {
    let name = kind.name();
    match store.spawn(kind) {
        Ok(_) => EditorOutcome::changed(),
        Err(e) => EditorOutcome::status(format!("Can't add {}: {}", name, e)),
    }
}

fn editing_label_mut(store: &mut EntityStore, id: EntityId) -> Option<&mut HelpLabel> {
    match store.get_mut(id).map(|e| &mut e.kind) {
        Some(EntityKind::HelpText(label)) => Some(label),
        _ => None,
    }
}

fn edit_label(editor: &mut EditorState, store: &mut EntityStore, input: &FrameInput) -> EditorOutcome {
    let Some(id) = editor.editing_label else {
        return EditorOutcome::default();
    };
    let Some(label) = editing_label_mut(store, id) else {
        editor.editing_label = None;
        return EditorOutcome::default();
    };

    let mut outcome = EditorOutcome::default();
    for &c in &input.typed {
        if label.text.chars().count() >= MAX_LABEL_LEN {
            outcome.status = Some(format!("Labels are limited to {} characters", MAX_LABEL_LEN));
            break;
        }
        label.text.push(c);
        outcome.changed = true;
    }
    if input.backspace && label.text.pop().is_some() {
        outcome.changed = true;
    }

    if input.enter || input.escape {
        outcome.merge(finish_label(editor, store));
    }
    outcome
}

/// Stop editing the current label, removing it if it was left empty
fn finish_label(editor: &mut EditorState, store: &mut EntityStore) -> EditorOutcome {
    let Some(id) = editor.editing_label.take() else {
        return EditorOutcome::default();
    };
    let empty = editing_label_mut(store, id).map(|l| l.text.is_empty()).unwrap_or(false);
    if empty && store.remove(id).is_some() {
        return EditorOutcome::changed();
    }
    EditorOutcome::default()
}

fn delete_at(editor: &mut EditorState, store: &mut EntityStore, point: Vec2) -> EditorOutcome {
    let removed = store.remove_where(|e| !e.kind.is_player() && hit_test(&e.kind, point));
    if removed == 0 {
        return EditorOutcome::default();
    }
    if let Some(id) = editor.editing_label {
        if store.get(id).is_none() {
            editor.editing_label = None;
        }
    }
    log::debug!("deleted {} entities at ({:.0}, {:.0})", removed, point.x, point.y);
    EditorOutcome::changed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseState;

    fn active_editor(tool: EditorTool) -> EditorState {
        let mut editor = EditorState::new();
        editor.toggle();
        editor.tool = tool;
        editor
    }

    fn mouse(position: Vec2, pressed: bool, down: bool, released: bool) -> FrameInput {
        FrameInput {
            mouse: MouseState {
                position,
                left_down: down,
                left_pressed: pressed,
                left_released: released,
                right_down: false,
            },
            ..Default::default()
        }
    }

    fn drag(editor: &mut EditorState, store: &mut EntityStore, from: Vec2, to: Vec2) -> EditorOutcome {
        let mut outcome = apply(editor, store, &mouse(from, true, true, false));
        outcome.merge(apply(editor, store, &mouse(to, false, true, false)));
        outcome.merge(apply(editor, store, &mouse(to, false, false, true)));
        outcome
    }

    #[test]
    fn test_inactive_editor_does_nothing() {
        let mut editor = EditorState::new();
        editor.tool = EditorTool::Extinguisher;
        let mut store = EntityStore::new();
        let outcome = apply(&mut editor, &mut store, &mouse(vec2(5.0, 5.0), true, true, false));
        assert_eq!(outcome, EditorOutcome::default());
        assert!(store.is_empty());
    }

    #[test]
    fn test_drag_creates_normalised_rect() {
        let mut editor = active_editor(EditorTool::Obstacle);
        let mut store = EntityStore::new();
        let outcome = drag(&mut editor, &mut store, vec2(100.0, 80.0), vec2(40.0, 20.0));
        assert!(outcome.changed);
        assert_eq!(store.obstacles(), vec![Bounds::new(40.0, 20.0, 60.0, 60.0)]);
        assert!(editor.drag.is_none());
    }

    #[test]
    fn test_tiny_drag_is_discarded() {
        let mut editor = active_editor(EditorTool::Ground);
        let mut store = EntityStore::new();
        let outcome = drag(&mut editor, &mut store, vec2(10.0, 10.0), vec2(12.0, 60.0));
        assert!(!outcome.changed);
        assert!(store.is_empty());
    }

    #[test]
    fn test_fire_tool_creates_fire() {
        let mut editor = active_editor(EditorTool::Fire);
        let mut store = EntityStore::new();
        drag(&mut editor, &mut store, vec2(0.0, 0.0), vec2(30.0, 30.0));
        assert_eq!(store.count_fires(), 1);
    }

    #[test]
    fn test_handle_drag_resizes() {
        let mut editor = active_editor(EditorTool::Obstacle);
        let mut store = EntityStore::new();
        let id = store.spawn(EntityKind::Obstacle(Bounds::new(10.0, 10.0, 50.0, 50.0))).unwrap();

        drag(&mut editor, &mut store, vec2(60.0, 60.0), vec2(110.0, 90.0));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).unwrap().kind.bounds(), Some(&Bounds::new(10.0, 10.0, 100.0, 80.0)));

        // Dragging past the anchor clamps to the minimum size
        drag(&mut editor, &mut store, vec2(110.0, 90.0), vec2(0.0, 0.0));
        assert_eq!(
            store.get(id).unwrap().kind.bounds(),
            Some(&Bounds::new(10.0, 10.0, MIN_RECT_SIZE, MIN_RECT_SIZE))
        );
    }

    #[test]
    fn test_place_extinguisher_and_move_player() {
        let mut editor = active_editor(EditorTool::Extinguisher);
        let mut store = EntityStore::new();
        apply(&mut editor, &mut store, &mouse(vec2(50.0, 50.0), true, true, false));
        assert_eq!(store.len(), 1);

        editor.tool = EditorTool::Player;
        apply(&mut editor, &mut store, &mouse(vec2(70.0, 80.0), true, true, false));
        apply(&mut editor, &mut store, &mouse(vec2(90.0, 20.0), true, true, false));
        assert_eq!(store.len(), 2);
        let (_, player) = store.player().unwrap();
        assert_eq!(player.position, vec2(90.0, 20.0));
        assert_eq!(player.spawn, vec2(90.0, 20.0));
    }

    #[test]
    fn test_player_must_be_placed_on_ground() {
        let mut editor = active_editor(EditorTool::Player);
        let mut store = EntityStore::new();
        store.spawn(EntityKind::Ground(Bounds::new(0.0, 0.0, 100.0, 100.0))).unwrap();
        store.spawn(EntityKind::Player(PlayerBody::at(vec2(50.0, 50.0)))).unwrap();

        let outcome = apply(&mut editor, &mut store, &mouse(vec2(300.0, 30.0), true, true, false));
        assert!(!outcome.changed);
        assert!(outcome.status.unwrap().contains("ground"));
        assert_eq!(store.player().unwrap().1.spawn, vec2(50.0, 50.0));

        apply(&mut editor, &mut store, &mouse(vec2(20.0, 30.0), true, true, false));
        assert_eq!(store.player().unwrap().1.spawn, vec2(20.0, 30.0));
    }

    #[test]
    fn test_right_button_deletes_all_but_player() {
        let mut editor = active_editor(EditorTool::Obstacle);
        let mut store = EntityStore::new();
        store.spawn(EntityKind::Ground(Bounds::new(0.0, 0.0, 100.0, 100.0))).unwrap();
        store.spawn(EntityKind::Obstacle(Bounds::new(20.0, 20.0, 40.0, 40.0))).unwrap();
        store.spawn(EntityKind::Player(PlayerBody::at(vec2(30.0, 30.0)))).unwrap();
        store.spawn(EntityKind::Obstacle(Bounds::new(200.0, 200.0, 40.0, 40.0))).unwrap();

        let mut input = mouse(vec2(30.0, 30.0), false, false, false);
        input.mouse.right_down = true;
        let outcome = apply(&mut editor, &mut store, &input);

        assert!(outcome.changed);
        assert_eq!(store.len(), 2);
        assert!(store.player().is_some());
        assert_eq!(store.obstacles(), vec![Bounds::new(200.0, 200.0, 40.0, 40.0)]);
    }

    #[test]
    fn test_label_typing() {
        let mut editor = active_editor(EditorTool::HelpText);
        let mut store = EntityStore::new();
        apply(&mut editor, &mut store, &mouse(vec2(10.0, 40.0), true, true, false));
        let id = editor.editing_label.unwrap();

        let typing = FrameInput { typed: vec!['h', 'i', 'x'], backspace: true, ..Default::default() };
        apply(&mut editor, &mut store, &typing);
        // Typed characters land before the backspace is applied
        let text = |store: &EntityStore| match &store.get(id).unwrap().kind {
            EntityKind::HelpText(label) => label.text.clone(),
            _ => unreachable!(),
        };
        assert_eq!(text(&store), "hi");

        apply(&mut editor, &mut store, &FrameInput { enter: true, ..Default::default() });
        assert!(editor.editing_label.is_none());
        assert_eq!(text(&store), "hi");

        // Clicking the label again resumes editing it
        apply(&mut editor, &mut store, &mouse(vec2(12.0, 35.0), true, true, false));
        assert_eq!(editor.editing_label, Some(id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_empty_label_is_removed() {
        let mut editor = active_editor(EditorTool::HelpText);
        let mut store = EntityStore::new();
        apply(&mut editor, &mut store, &mouse(vec2(10.0, 40.0), true, true, false));
        assert_eq!(store.len(), 1);
        apply(&mut editor, &mut store, &FrameInput { escape: true, ..Default::default() });
        assert!(store.is_empty());
    }

    #[test]
    fn test_tool_keys_ignored_while_typing() {
        let mut editor = active_editor(EditorTool::HelpText);
        let mut store = EntityStore::new();
        apply(&mut editor, &mut store, &mouse(vec2(10.0, 40.0), true, true, false));
        apply(&mut editor, &mut store, &FrameInput { tool_slot: Some(0), ..Default::default() });
        assert_eq!(editor.tool, EditorTool::HelpText);

        editor.editing_label = None;
        let outcome = apply(&mut editor, &mut store, &FrameInput { tool_slot: Some(1), ..Default::default() });
        assert_eq!(editor.tool, EditorTool::Ground);
        assert!(outcome.status.is_some());
    }

    #[test]
    fn test_full_store_reports_status() {
        let mut editor = active_editor(EditorTool::Extinguisher);
        let mut store = EntityStore::with_capacity(1);
        store.spawn(EntityKind::Obstacle(Bounds::new(0.0, 0.0, 10.0, 10.0))).unwrap();

        let outcome = apply(&mut editor, &mut store, &mouse(vec2(50.0, 50.0), true, true, false));
        assert!(!outcome.changed);
        assert!(outcome.status.unwrap().contains("limit"));
        assert_eq!(store.len(), 1);
    }
}
