use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::camera::{Vec2, PAN_SPEED};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    ZoomIn,
    ZoomOut,
    Screenshot,
    Quit,
}

const ACTION_COUNT: usize = 8;

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::PanUp => 0,
            InputAction::PanDown => 1,
            InputAction::PanLeft => 2,
            InputAction::PanRight => 3,
            InputAction::ZoomIn => 4,
            InputAction::ZoomOut => 5,
            InputAction::Screenshot => 6,
            InputAction::Quit => 7,
        }
    }

    pub fn from_physical_key(key: PhysicalKey) -> Option<Self> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        match code {
            KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::PanUp),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::PanDown),
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::PanLeft),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::PanRight),
            KeyCode::Equal | KeyCode::NumpadAdd => Some(InputAction::ZoomIn),
            KeyCode::Minus | KeyCode::NumpadSubtract => Some(InputAction::ZoomOut),
            KeyCode::F12 => Some(InputAction::Screenshot),
            KeyCode::Escape => Some(InputAction::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    /// Records the new state and reports whether this is a fresh press.
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) -> bool {
        let was_down = std::mem::replace(&mut self.down[action.index()], is_down);
        is_down && !was_down
    }
}

/// Zoom steps anchored where the cursor was when they were issued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ZoomRequest {
    pub steps: i32,
    /// `None` when the cursor was outside the window; zoom about the center.
    pub anchor: Option<Vec2>,
}

/// Input gathered since the previous frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FrameInput {
    /// Screen-space drag delta; the view follows the pointer.
    pub pan: Vec2,
    /// In arrival order.
    pub zooms: Vec<ZoomRequest>,
    pub screenshot_requested: bool,
    pub cursor: Option<Vec2>,
}

#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    pub(crate) quit_requested: bool,
    action_states: ActionStates,
    pending_pan: Vec2,
    pending_zooms: Vec<ZoomRequest>,
    screenshot_pressed_edge: bool,
    cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    pub(crate) fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    pub(crate) fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    pub(crate) fn handle_keyboard_input(&mut self, key_event: &winit::event::KeyEvent) {
        self.handle_physical_key(
            key_event.physical_key,
            key_event.state == ElementState::Pressed,
        );
    }

    pub(crate) fn handle_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        let Some(action) = InputAction::from_physical_key(key) else {
            return;
        };
        if !self.action_states.set(action, is_pressed) {
            return;
        }
        match action {
            // Key pans move the camera, so the drag delta is the opposite direction.
            InputAction::PanUp => self.pending_pan.y += PAN_SPEED,
            InputAction::PanDown => self.pending_pan.y -= PAN_SPEED,
            InputAction::PanLeft => self.pending_pan.x += PAN_SPEED,
            InputAction::PanRight => self.pending_pan.x -= PAN_SPEED,
            InputAction::ZoomIn => self.push_zoom(1),
            InputAction::ZoomOut => self.push_zoom(-1),
            InputAction::Screenshot => self.screenshot_pressed_edge = true,
            InputAction::Quit => self.mark_quit_requested(),
        }
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    pub(crate) fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub(crate) fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        let next = Vec2::new(x, y);
        if self.left_mouse_is_down {
            if let Some(previous) = self.cursor_position_px {
                self.pending_pan.x += next.x - previous.x;
                self.pending_pan.y += next.y - previous.y;
            }
        }
        self.cursor_position_px = Some(next);
    }

    pub(crate) fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    pub(crate) fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        self.push_zoom(zoom_steps_from_scroll_delta(delta));
    }

    fn push_zoom(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        let anchor = self.cursor_position_px;
        match self.pending_zooms.last_mut() {
            Some(last) if last.anchor == anchor => {
                last.steps = last.steps.saturating_add(steps);
            }
            _ => self.pending_zooms.push(ZoomRequest { steps, anchor }),
        }
    }

    pub(crate) fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.left_mouse_is_down = state == ElementState::Pressed;
        }
    }

    pub(crate) fn take_frame_input(&mut self) -> FrameInput {
        let input = FrameInput {
            pan: self.pending_pan,
            zooms: std::mem::take(&mut self.pending_zooms),
            screenshot_requested: self.screenshot_pressed_edge,
            cursor: self.cursor_position_px,
        };
        self.pending_pan = Vec2::ZERO;
        self.screenshot_pressed_edge = false;
        input
    }
}

pub(crate) fn zoom_steps_from_scroll_delta(delta: MouseScrollDelta) -> i32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y.round() as i32,
        MouseScrollDelta::PixelDelta(position) => {
            if position.y > 0.0 {
                1
            } else if position.y < 0.0 {
                -1
            } else {
                0
            }
        }
    }
}
