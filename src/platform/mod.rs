//! Input boundary between the host shell and the simulation
//!
//! The shell forwards key presses/releases; the simulation only ever reads
//! the set of held movement keys once per step.

use serde::{Deserialize, Serialize};

/// Keys the level reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Left,
    Right,
    /// Edge-triggered pause/escape
    Escape,
}

/// Movement keys that can be held down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKey {
    Up,
    Left,
    Right,
}

impl Key {
    /// The movement key this key holds, if any
    pub fn as_move(self) -> Option<MoveKey> {
        match self {
            Key::Up => Some(MoveKey::Up),
            Key::Left => Some(MoveKey::Left),
            Key::Right => Some(MoveKey::Right),
            Key::Escape => None,
        }
    }
}

/// Set of currently held movement keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldKeys {
    pub up: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a list of keys
    pub fn of(keys: &[MoveKey]) -> Self {
        let mut held = Self::default();
        for &key in keys {
            held.press(key);
        }
        held
    }

    pub fn press(&mut self, key: MoveKey) {
        *self.slot(key) = true;
    }

    pub fn release(&mut self, key: MoveKey) {
        *self.slot(key) = false;
    }

    pub fn contains(&self, key: MoveKey) -> bool {
        match key {
            MoveKey::Up => self.up,
            MoveKey::Left => self.left,
            MoveKey::Right => self.right,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.up || self.left || self.right)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn slot(&mut self, key: MoveKey) -> &mut bool {
        match key {
            MoveKey::Up => &mut self.up,
            MoveKey::Left => &mut self.left,
            MoveKey::Right => &mut self.right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release() {
        let mut keys = HeldKeys::new();
        assert!(keys.is_empty());

        keys.press(MoveKey::Left);
        keys.press(MoveKey::Up);
        assert!(keys.contains(MoveKey::Left));
        assert!(keys.contains(MoveKey::Up));
        assert!(!keys.contains(MoveKey::Right));

        // Repeated presses are idempotent
        keys.press(MoveKey::Left);
        keys.release(MoveKey::Left);
        assert!(!keys.contains(MoveKey::Left));
        assert!(!keys.is_empty());

        keys.clear();
        assert!(keys.is_empty());
    }

    #[test]
    fn test_escape_is_not_a_move_key() {
        assert_eq!(Key::Escape.as_move(), None);
        assert_eq!(Key::Right.as_move(), Some(MoveKey::Right));
        assert_eq!(
            HeldKeys::of(&[MoveKey::Right, MoveKey::Up]),
            HeldKeys {
                up: true,
                left: false,
                right: true
            }
        );
    }
}
