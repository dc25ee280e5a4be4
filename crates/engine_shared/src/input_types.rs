// crates/engine_shared/src/input_types.rs
//! Compact input types handed from the host to the simulation module.
//!
//! Held keys arrive as a per-frame `InputState` snapshot (resolved into
//! actions by the host's key map); discrete presses arrive separately as
//! `GameEvent`s so text entry and hotkeys never miss a keystroke.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Digital actions the game polls every frame.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveLeft = 0,
    MoveRight = 1,
    MoveUp = 2,
    MoveDown = 3,
    Jump = 4,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveUp,
        Action::MoveDown,
        Action::Jump,
    ];

    #[inline]
    fn bit(self) -> u64 {
        1u64 << (self as u8)
    }
}

/// Mouse button bits inside `MouseState::buttons`.
pub const MOUSE_LEFT: u32 = 1 << 0;
pub const MOUSE_RIGHT: u32 = 1 << 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MouseState {
    pub pos: DVec2,
    pub buttons: u32,
}

impl MouseState {
    pub fn is_down(&self, button: u32) -> bool {
        self.buttons & button != 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    /// Bitmask of held actions, indexed by `Action as u8`.
    pub digital_mask: u64,
    pub mouse: MouseState,
}

impl InputState {
    pub fn is_active(&self, action: Action) -> bool {
        self.digital_mask & action.bit() != 0
    }

    pub fn set(&mut self, action: Action, active: bool) {
        if active {
            self.digital_mask |= action.bit();
        } else {
            self.digital_mask &= !action.bit();
        }
    }

    /// -1, 0 or 1 depending on which of the two opposing actions are held.
    pub fn axis(&self, negative: Action, positive: Action) -> f64 {
        self.is_active(positive) as i32 as f64 - self.is_active(negative) as i32 as f64
    }

    pub fn with(mut self, action: Action) -> Self {
        self.set(action, true);
        self
    }
}

/// Logical key identity for discrete presses. Printable keys come through as
/// `Char`, already lower-cased by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Backspace,
    Enter,
    Escape,
    Left,
    Right,
    Up,
    Down,
    F1,
    F2,
    F5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    KeyPressed(Key),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_roundtrip_per_action() {
        let mut state = InputState::default();
        for action in Action::ALL {
            assert!(!state.is_active(action));
            state.set(action, true);
            assert!(state.is_active(action));
        }
        state.set(Action::Jump, false);
        assert!(!state.is_active(Action::Jump));
        assert!(state.is_active(Action::MoveDown));
    }

    #[test]
    fn opposing_actions_cancel() {
        let state = InputState::default()
            .with(Action::MoveLeft)
            .with(Action::MoveRight);
        assert_eq!(state.axis(Action::MoveLeft, Action::MoveRight), 0.0);

        let left = InputState::default().with(Action::MoveLeft);
        assert_eq!(left.axis(Action::MoveLeft, Action::MoveRight), -1.0);
    }
}
