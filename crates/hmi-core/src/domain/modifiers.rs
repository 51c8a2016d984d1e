//! Modifier and lock state.
//!
//! Modifiers (Shift, Ctrl, Alt, Meta) are momentary: they are active only
//! while held.  Each modifier has a left and a right key; the modifier stays
//! active while either of them is down.  Locks (Caps, Num, Scroll) are toggles: each full press flips
//! them and they survive the release.
//!
//! [`ModifierLockState`] is the only mutable owner of these flags.  Anything
//! that needs to read them (character resolution, outgoing events) takes a
//! [`ModifierSnapshot`], which is `Copy` and therefore cannot observe later
//! changes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::keymap::{classify, KeyClass, KeyCode, LockKey, Modifier};

/// Momentary modifier flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Returns `true` if no modifier is held.
    pub fn is_empty(&self) -> bool {
        !(self.shift || self.ctrl || self.alt || self.meta)
    }
}

/// Toggle lock flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockState {
    pub caps_lock: bool,
    pub num_lock: bool,
    pub scroll_lock: bool,
}

impl Default for LockState {
    /// NumLock starts on; Caps and Scroll start off.
    fn default() -> Self {
        Self {
            caps_lock: false,
            num_lock: true,
            scroll_lock: false,
        }
    }
}

/// Immutable copy of the modifier and lock state at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifierSnapshot {
    pub modifiers: Modifiers,
    pub locks: LockState,
}

/// Mutable modifier and lock state for one panel.
#[derive(Debug, Clone, Default)]
pub struct ModifierLockState {
    modifiers: Modifiers,
    locks: LockState,
    /// Physical modifier keys that are down (ShiftLeft, ShiftRight, ...).
    held: HashSet<KeyCode>,
}

impl ModifierLockState {
    /// Creates the start-up state: all modifiers up, NumLock on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a press (`pressed = true`) or release of a modifier key.
    ///
    /// The modifier flag is the OR of its left and right keys, so releasing
    /// `ShiftRight` while `ShiftLeft` is still down keeps Shift active.
    /// Returns the affected modifier, or `None` if `key` is not a modifier.
    pub fn apply_modifier_transition(&mut self, key: KeyCode, pressed: bool) -> Option<Modifier> {
        let KeyClass::Modifier(modifier) = classify(key) else {
            return None;
        };
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
        let still_down = self
            .held
            .iter()
            .any(|&k| classify(k) == KeyClass::Modifier(modifier));
        *self.modifier_flag(modifier) = still_down;
        Some(modifier)
    }

    /// Flips a lock.  Call on key press only.  Returns the new value.
    pub fn apply_lock_toggle(&mut self, lock: LockKey) -> bool {
        let flag = self.lock_flag(lock);
        *flag = !*flag;
        *flag
    }

    /// Forces a lock to a value (used by runtime controls).
    pub fn set_lock(&mut self, lock: LockKey, on: bool) {
        *self.lock_flag(lock) = on;
    }

    /// Returns the current value of a lock.
    pub fn lock(&self, lock: LockKey) -> bool {
        match lock {
            LockKey::Caps => self.locks.caps_lock,
            LockKey::Num => self.locks.num_lock,
            LockKey::Scroll => self.locks.scroll_lock,
        }
    }

    /// Returns `true` if the modifier is currently held.
    pub fn is_held(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Shift => self.modifiers.shift,
            Modifier::Ctrl => self.modifiers.ctrl,
            Modifier::Alt => self.modifiers.alt,
            Modifier::Meta => self.modifiers.meta,
        }
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> ModifierSnapshot {
        ModifierSnapshot {
            modifiers: self.modifiers,
            locks: self.locks,
        }
    }

    fn modifier_flag(&mut self, modifier: Modifier) -> &mut bool {
        match modifier {
            Modifier::Shift => &mut self.modifiers.shift,
            Modifier::Ctrl => &mut self.modifiers.ctrl,
            Modifier::Alt => &mut self.modifiers.alt,
            Modifier::Meta => &mut self.modifiers.meta,
        }
    }

    fn lock_flag(&mut self, lock: LockKey) -> &mut bool {
        match lock {
            LockKey::Caps => &mut self.locks.caps_lock,
            LockKey::Num => &mut self.locks.num_lock,
            LockKey::Scroll => &mut self.locks.scroll_lock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_has_numlock_on_and_everything_else_off() {
        let state = ModifierLockState::new();
        let snap = state.snapshot();

        assert!(snap.modifiers.is_empty());
        assert!(snap.locks.num_lock);
        assert!(!snap.locks.caps_lock);
        assert!(!snap.locks.scroll_lock);
    }

    #[test]
    fn test_modifier_is_held_only_between_press_and_release() {
        // Arrange
        let mut state = ModifierLockState::new();

        // Act
        state.apply_modifier_transition(KeyCode::ControlLeft, true);
        let held = state.is_held(Modifier::Ctrl);
        state.apply_modifier_transition(KeyCode::ControlLeft, false);

        // Assert
        assert!(held);
        assert!(!state.is_held(Modifier::Ctrl));
    }

    #[test]
    fn test_shift_stays_held_while_other_side_is_down() {
        // Arrange
        let mut state = ModifierLockState::new();
        state.apply_modifier_transition(KeyCode::ShiftLeft, true);
        state.apply_modifier_transition(KeyCode::ShiftRight, true);

        // Act
        state.apply_modifier_transition(KeyCode::ShiftRight, false);
        let after_right_up = state.is_held(Modifier::Shift);
        state.apply_modifier_transition(KeyCode::ShiftLeft, false);

        // Assert
        assert!(after_right_up);
        assert!(!state.is_held(Modifier::Shift));
    }

    #[test]
    fn test_releasing_one_modifier_does_not_affect_another() {
        // Arrange
        let mut state = ModifierLockState::new();
        state.apply_modifier_transition(KeyCode::ControlRight, true);
        state.apply_modifier_transition(KeyCode::AltLeft, true);

        // Act
        state.apply_modifier_transition(KeyCode::AltLeft, false);

        // Assert
        assert!(state.is_held(Modifier::Ctrl));
        assert!(!state.is_held(Modifier::Alt));
    }

    #[test]
    fn test_transition_of_non_modifier_key_is_ignored() {
        let mut state = ModifierLockState::new();

        assert_eq!(state.apply_modifier_transition(KeyCode::KeyA, true), None);
        assert_eq!(state.snapshot(), ModifierSnapshot::default());
    }

    #[test]
    fn test_lock_toggle_parity() {
        for presses in 0..6 {
            // Arrange
            let mut state = ModifierLockState::new();
            let initial = state.lock(LockKey::Caps);

            // Act
            for _ in 0..presses {
                state.apply_lock_toggle(LockKey::Caps);
            }

            // Assert
            let expected = if presses % 2 == 0 { initial } else { !initial };
            assert_eq!(state.lock(LockKey::Caps), expected, "after {presses} presses");
        }
    }

    #[test]
    fn test_apply_lock_toggle_returns_new_value() {
        let mut state = ModifierLockState::new();

        assert!(!state.apply_lock_toggle(LockKey::Num));
        assert!(state.apply_lock_toggle(LockKey::Num));
    }

    #[test]
    fn test_snapshot_does_not_observe_later_changes() {
        // Arrange
        let mut state = ModifierLockState::new();
        state.apply_modifier_transition(KeyCode::ShiftLeft, true);

        // Act
        let snap = state.snapshot();
        state.apply_modifier_transition(KeyCode::ShiftLeft, false);
        state.apply_lock_toggle(LockKey::Caps);

        // Assert
        assert!(snap.modifiers.shift);
        assert!(!snap.locks.caps_lock);
    }

    #[test]
    fn test_set_lock_forces_value() {
        let mut state = ModifierLockState::new();

        state.set_lock(LockKey::Num, false);
        state.set_lock(LockKey::Scroll, true);

        assert!(!state.lock(LockKey::Num));
        assert!(state.lock(LockKey::Scroll));
    }
}
