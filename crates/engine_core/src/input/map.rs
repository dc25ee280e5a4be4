// crates/engine_core/src/input/map.rs
use std::collections::HashMap;

use engine_shared::{Action, Key};
use winit::keyboard::{Key as LogicalKey, KeyCode, NamedKey};

/// Physical key -> held action. Layout independent, so WASD stays WASD.
#[derive(Default)]
pub struct InputMap {
    key_bindings: HashMap<KeyCode, Action>,
}

impl InputMap {
    /// WASD movement, Space to jump.
    pub fn standard() -> Self {
        let mut map = Self::default();
        map.bind(KeyCode::KeyA, Action::MoveLeft);
        map.bind(KeyCode::KeyD, Action::MoveRight);
        map.bind(KeyCode::KeyW, Action::MoveUp);
        map.bind(KeyCode::KeyS, Action::MoveDown);
        map.bind(KeyCode::Space, Action::Jump);
        map
    }

    pub fn bind(&mut self, key: KeyCode, action: Action) {
        self.key_bindings.insert(key, action);
    }

    pub fn map_signal_to_intent(&self, key: KeyCode) -> Option<Action> {
        self.key_bindings.get(&key).copied()
    }
}

/// Logical key -> discrete key event. Characters are lower-cased.
pub fn translate_key(key: &LogicalKey) -> Option<Key> {
    match key {
        LogicalKey::Named(named) => match named {
            NamedKey::Backspace => Some(Key::Backspace),
            NamedKey::Enter => Some(Key::Enter),
            NamedKey::Escape => Some(Key::Escape),
            NamedKey::ArrowLeft => Some(Key::Left),
            NamedKey::ArrowRight => Some(Key::Right),
            NamedKey::ArrowUp => Some(Key::Up),
            NamedKey::ArrowDown => Some(Key::Down),
            NamedKey::F1 => Some(Key::F1),
            NamedKey::F2 => Some(Key::F2),
            NamedKey::F5 => Some(Key::F5),
            NamedKey::Space => Some(Key::Char(' ')),
            _ => None,
        },
        LogicalKey::Character(s) => s.chars().next().and_then(|c| c.to_lowercase().next()).map(Key::Char),
        _ => None,
    }
}
