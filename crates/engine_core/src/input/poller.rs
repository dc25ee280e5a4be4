// crates/engine_core/src/input/poller.rs

use engine_shared::{InputState, Key, MouseState, Vec2, MOUSE_LEFT, MOUSE_RIGHT};
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::keyboard::{Key as LogicalKey, KeyCode, PhysicalKey};

use crate::canvas::Viewport;
use crate::input::{translate_key, InputMap};

/// Low-level input collector: held physical keys, queued presses and the
/// mouse. Keeps raw device state out of the runner.
#[derive(Default)]
pub struct InputPoller {
    active_keys: Vec<KeyCode>,
    pressed: Vec<Key>,
    /// Cursor in physical pixels.
    cursor: (f64, f64),
    buttons: u32,
}

impl InputPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a single winit WindowEvent and update internal state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => self.handle_keyboard_input(key_event),
            WindowEvent::CursorMoved { position, .. } => self.cursor = (position.x, position.y),
            WindowEvent::MouseInput { state, button, .. } => self.record_button(*button, *state),
            WindowEvent::Focused(false) => {
                self.active_keys.clear();
                self.buttons = 0;
            }
            _ => {}
        }
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        self.record_key(key_event.physical_key, &key_event.logical_key, key_event.state);
    }

    fn record_key(&mut self, physical: PhysicalKey, logical: &LogicalKey, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if let PhysicalKey::Code(keycode) = physical {
                    if !self.active_keys.contains(&keycode) {
                        self.active_keys.push(keycode);
                    }
                }
                // Repeats are kept so holding Backspace keeps deleting.
                if let Some(key) = translate_key(logical) {
                    self.pressed.push(key);
                }
            }
            ElementState::Released => {
                if let PhysicalKey::Code(keycode) = physical {
                    self.active_keys.retain(|&k| k != keycode);
                }
            }
        }
    }

    fn record_button(&mut self, button: MouseButton, state: ElementState) {
        let bit = match button {
            MouseButton::Left => MOUSE_LEFT,
            MouseButton::Right => MOUSE_RIGHT,
            _ => return,
        };
        match state {
            ElementState::Pressed => self.buttons |= bit,
            ElementState::Released => self.buttons &= !bit,
        }
    }

    pub fn is_key_active(&self, key: KeyCode) -> bool {
        self.active_keys.contains(&key)
    }

    /// Discrete presses since the last call, oldest first.
    pub fn drain_pressed(&mut self) -> Vec<Key> {
        std::mem::take(&mut self.pressed)
    }

    /// Held actions plus the cursor mapped into module coordinates.
    pub fn snapshot(&self, input_map: &InputMap, viewport: &Viewport, pixels_per_point: f32) -> InputState {
        let mut input = InputState::default();
        for &key in &self.active_keys {
            if let Some(action) = input_map.map_signal_to_intent(key) {
                input.set(action, true);
            }
        }

        let ppp = pixels_per_point.max(f32::EPSILON);
        let points = egui::pos2(self.cursor.0 as f32 / ppp, self.cursor.1 as f32 / ppp);
        let pos: Vec2 = viewport.to_logical(points);
        input.mouse = MouseState {
            pos,
            buttons: self.buttons,
        };
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_shared::Action;
    use winit::keyboard::NamedKey;

    fn press(poller: &mut InputPoller, code: KeyCode, logical: LogicalKey) {
        poller.record_key(PhysicalKey::Code(code), &logical, ElementState::Pressed);
    }

    fn release(poller: &mut InputPoller, code: KeyCode, logical: LogicalKey) {
        poller.record_key(PhysicalKey::Code(code), &logical, ElementState::Released);
    }

    #[test]
    fn held_keys_become_actions() {
        let mut poller = InputPoller::new();
        let map = InputMap::standard();
        press(&mut poller, KeyCode::KeyD, LogicalKey::Character("d".into()));
        press(&mut poller, KeyCode::Space, LogicalKey::Named(NamedKey::Space));

        let input = poller.snapshot(&map, &Viewport::default(), 1.0);
        assert!(input.is_active(Action::MoveRight));
        assert!(input.is_active(Action::Jump));
        assert!(!input.is_active(Action::MoveLeft));

        release(&mut poller, KeyCode::Space, LogicalKey::Named(NamedKey::Space));
        assert!(!poller.snapshot(&map, &Viewport::default(), 1.0).is_active(Action::Jump));
    }

    #[test]
    fn presses_queue_in_order() {
        let mut poller = InputPoller::new();
        press(&mut poller, KeyCode::KeyK, LogicalKey::Character("K".into()));
        press(&mut poller, KeyCode::Backspace, LogicalKey::Named(NamedKey::Backspace));
        press(&mut poller, KeyCode::Backspace, LogicalKey::Named(NamedKey::Backspace));
        assert_eq!(poller.drain_pressed(), vec![Key::Char('k'), Key::Backspace, Key::Backspace]);
        assert!(poller.drain_pressed().is_empty());
    }

    #[test]
    fn mouse_maps_through_viewport() {
        let mut poller = InputPoller::new();
        poller.cursor = (300.0, 120.0);
        poller.record_button(MouseButton::Left, ElementState::Pressed);

        let view = Viewport {
            origin: egui::pos2(0.0, 0.0),
            scale: 1.0,
        };
        let input = poller.snapshot(&InputMap::default(), &view, 2.0);
        assert_eq!(input.mouse.pos, Vec2::new(150.0, 60.0));
        assert!(input.mouse.is_down(MOUSE_LEFT));

        poller.record_button(MouseButton::Left, ElementState::Released);
        assert!(!poller.snapshot(&InputMap::default(), &view, 2.0).mouse.is_down(MOUSE_LEFT));
    }
}
