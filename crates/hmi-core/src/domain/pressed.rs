//! Set of currently held keys.
//!
//! Each held key also remembers the logical key name its press was sent
//! with, so the matching release carries the same name even if NumLock or
//! Shift changed in between.

use std::collections::HashMap;

use crate::keymap::KeyCode;

/// Keys that are down right now.  Each key appears at most once.
#[derive(Debug, Clone, Default)]
pub struct PressedKeySet {
    keys: HashMap<KeyCode, Option<String>>,
}

impl PressedKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a key as down.  Returns `false` if it already was, which means
    /// the press is a duplicate and must be ignored.
    pub fn insert(&mut self, key: KeyCode) -> bool {
        if self.keys.contains_key(&key) {
            return false;
        }
        self.keys.insert(key, None);
        true
    }

    /// Records the logical key name sent with the press of a held key.
    /// Does nothing if the key is not down.
    pub fn record_label(&mut self, key: KeyCode, label: impl Into<String>) {
        if let Some(slot) = self.keys.get_mut(&key) {
            *slot = Some(label.into());
        }
    }

    /// Returns the logical key name recorded for a held key.
    pub fn label(&self, key: KeyCode) -> Option<&str> {
        self.keys.get(&key).and_then(|label| label.as_deref())
    }

    /// Marks a key as up.  Returns `false` if it was not down.
    pub fn remove(&mut self, key: KeyCode) -> bool {
        self.keys.remove(&key).is_some()
    }

    /// Marks a key as up and hands back its recorded label.
    ///
    /// Returns `None` if the key was not down, `Some(None)` if it was down
    /// but no label was recorded.
    pub fn take(&mut self, key: KeyCode) -> Option<Option<String>> {
        self.keys.remove(&key)
    }

    pub fn contains(&self, key: KeyCode) -> bool {
        self.keys.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_insert_of_same_key_is_rejected() {
        let mut set = PressedKeySet::new();

        assert!(set.insert(KeyCode::KeyA));
        assert!(!set.insert(KeyCode::KeyA));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_allows_key_to_be_pressed_again() {
        // Arrange
        let mut set = PressedKeySet::new();
        set.insert(KeyCode::KeyA);

        // Act
        let removed = set.remove(KeyCode::KeyA);

        // Assert
        assert!(removed);
        assert!(!set.contains(KeyCode::KeyA));
        assert!(set.insert(KeyCode::KeyA));
    }

    #[test]
    fn test_take_returns_label_recorded_at_press() {
        // Arrange
        let mut set = PressedKeySet::new();
        set.insert(KeyCode::Numpad5);
        set.record_label(KeyCode::Numpad5, "5");

        // Act
        let taken = set.take(KeyCode::Numpad5);

        // Assert
        assert_eq!(taken, Some(Some("5".to_string())));
        assert!(!set.contains(KeyCode::Numpad5));
    }

    #[test]
    fn test_label_is_not_recorded_for_key_that_is_up() {
        let mut set = PressedKeySet::new();

        set.record_label(KeyCode::KeyA, "a");

        assert_eq!(set.label(KeyCode::KeyA), None);
        assert_eq!(set.take(KeyCode::KeyA), None);
    }

    #[test]
    fn test_remove_of_unpressed_key_returns_false() {
        let mut set = PressedKeySet::new();

        assert!(!set.remove(KeyCode::Enter));
        assert!(set.is_empty());
    }
}
