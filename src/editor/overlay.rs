//! Editor overlay drawing

use macroquad::prelude::*;

use super::actions::{handle_bounds, PICK_RADIUS};
use super::state::{Drag, EditorState, EditorTool};
use crate::game::entity::{EntityKind, EntityStore};
use crate::game::geometry::Bounds;

const ACCENT: Color = Color::new(0.3, 0.8, 1.0, 1.0);
const DIM: Color = Color::new(0.6, 0.6, 0.6, 1.0);
/// Height of the "Editing" bar across the top of the screen
pub const BANNER_HEIGHT: f32 = 28.0;

/// Draw the editor UI on top of the world
pub fn draw_overlay(editor: &EditorState, store: &EntityStore, mouse: Vec2) {
    if !editor.active {
        return;
    }

    let sw = screen_width();
    draw_rectangle(0.0, 0.0, sw, BANNER_HEIGHT, Color::new(0.0, 0.0, 0.0, 0.7));
    draw_text("Editing", 10.0, 20.0, 22.0, ACCENT);

    // Tool list, active tool highlighted
    let mut x = 110.0;
    for (i, tool) in EditorTool::ALL.iter().enumerate() {
        let text = format!("{} {}", i + 1, tool.label());
        let color = if *tool == editor.tool { ACCENT } else { DIM };
        draw_text(&text, x, 20.0, 18.0, color);
        x += measure_text(&text, None, 18, 1.0).width + 16.0;
    }

    // Outlines and resize handles
    for entity in store.iter() {
        if let Some(b) = entity.kind.bounds() {
            draw_rectangle_lines(b.x, b.y, b.w, b.h, 1.0, Color::new(1.0, 1.0, 1.0, 0.3));
            let h = handle_bounds(b);
            draw_rectangle(h.x, h.y, h.w, h.h, ACCENT);
        }
        if let EntityKind::Extinguisher(ext) = &entity.kind {
            draw_circle_lines(ext.position.x, ext.position.y, PICK_RADIUS, 1.0, Color::new(1.0, 1.0, 1.0, 0.3));
        }
    }

    if let Some(Drag::Create { tool, start }) = editor.drag {
        let preview = Bounds::from_corners(start, mouse);
        draw_rectangle_lines(preview.x, preview.y, preview.w, preview.h, 2.0, ACCENT);
        draw_text(tool.label(), preview.x, preview.y - 4.0, 16.0, ACCENT);
    }

    // Caret after the label being typed
    if let Some(EntityKind::HelpText(label)) = editor.editing_label.and_then(|id| store.get(id)).map(|e| &e.kind) {
        let size = label.font_size as f32;
        let width = measure_text(&label.text, None, label.font_size, 1.0).width;
        if (get_time() * 2.0) as i64 % 2 == 0 {
            draw_line(
                label.position.x + width + 2.0,
                label.position.y - size * 0.8,
                label.position.x + width + 2.0,
                label.position.y + 2.0,
                2.0,
                ACCENT,
            );
        }
        draw_rectangle_lines(label.position.x - 4.0, label.position.y - size, width.max(size) + 10.0, size + 6.0, 1.0, DIM);
    }

    draw_text(
        "Drag: create  |  Corner: resize  |  Right mouse: delete  |  Tab: play",
        10.0,
        screen_height() - 10.0,
        16.0,
        DIM,
    );
}
