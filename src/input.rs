//! Per-frame input snapshot
//!
//! Gameplay and editor code never query macroquad directly. `FrameInput` is
//! captured once at the top of the frame and passed down, which keeps the
//! simulation and the editor testable without a window.

use macroquad::input::{
    get_char_pressed, is_key_down, is_key_pressed, is_mouse_button_down, is_mouse_button_pressed,
    is_mouse_button_released, mouse_position, KeyCode, MouseButton,
};
use macroquad::math::{vec2, Vec2};

/// Mouse button state
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseState {
    pub position: Vec2,
    pub left_down: bool,
    pub left_pressed: bool,  // Just pressed this frame
    pub left_released: bool, // Just released this frame
    pub right_down: bool,
}

/// Everything the game reads from the keyboard and mouse in one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Raw WASD axis, each component in {-1, 0, 1}
    pub movement: Vec2,
    pub mouse: MouseState,
    /// Space held (spray without the mouse)
    pub spray_key: bool,
    /// Q pressed: drop the carried extinguisher
    pub drop: bool,
    /// Tab pressed: toggle the editor
    pub toggle_editor: bool,
    /// 1-6 pressed: editor tool slot (0-based)
    pub tool_slot: Option<usize>,
    /// F5 or Ctrl+S
    pub save: bool,
    /// F9
    pub reload: bool,
    pub enter: bool,
    pub escape: bool,
    pub backspace: bool,
    /// Printable characters typed this frame
    pub typed: Vec<char>,
}

const TOOL_KEYS: [KeyCode; 6] = [
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
];

impl FrameInput {
    /// Read the current frame's input from macroquad
    pub fn capture() -> Self {
        let axis = |neg: KeyCode, pos: KeyCode| (is_key_down(pos) as i32 - is_key_down(neg) as i32) as f32;
        let (mx, my) = mouse_position();
        let ctrl = is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl);

        let mut typed = Vec::new();
        while let Some(c) = get_char_pressed() {
            typed.push(c);
        }

        let input = Self {
            movement: vec2(axis(KeyCode::A, KeyCode::D), axis(KeyCode::W, KeyCode::S)),
            mouse: MouseState {
                position: vec2(mx, my),
                left_down: is_mouse_button_down(MouseButton::Left),
                left_pressed: is_mouse_button_pressed(MouseButton::Left),
                left_released: is_mouse_button_released(MouseButton::Left),
                right_down: is_mouse_button_down(MouseButton::Right),
            },
            spray_key: is_key_down(KeyCode::Space),
            drop: is_key_pressed(KeyCode::Q),
            toggle_editor: is_key_pressed(KeyCode::Tab),
            tool_slot: TOOL_KEYS.iter().position(|&k| is_key_pressed(k)),
            save: is_key_pressed(KeyCode::F5) || (ctrl && is_key_pressed(KeyCode::S)),
            reload: is_key_pressed(KeyCode::F9),
            enter: is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter),
            escape: is_key_pressed(KeyCode::Escape),
            backspace: is_key_pressed(KeyCode::Backspace),
            typed,
        };
        if ctrl {
            input.with_ctrl_held()
        } else {
            input.without_control_chars()
        }
    }

    /// Letters pressed together with Ctrl are shortcuts, not movement or text
    pub fn with_ctrl_held(self) -> Self {
        Self {
            movement: Vec2::ZERO,
            typed: Vec::new(),
            ..self
        }
    }

    fn without_control_chars(mut self) -> Self {
        self.typed.retain(|c| !c.is_control());
        self
    }

    /// Input with gameplay keys cleared, used while a text label has focus
    pub fn without_gameplay_keys(&self) -> Self {
        Self {
            movement: Vec2::ZERO,
            spray_key: false,
            drop: false,
            tool_slot: None,
            ..self.clone()
        }
    }
}
