//! Keyboard layouts and character resolution.
//!
//! A layout decides which character a physical key produces.  Resolution is
//! table-driven:
//!
//! 1. The layout remaps the key's base (QWERTY) character, e.g. `KeyY`
//!    types `z` on QWERTZ.
//! 2. Letters are upper-cased when exactly one of Shift and CapsLock is
//!    active (Shift XOR Caps).
//! 3. Other characters switch to their shift-layer symbol while Shift is held.

use serde::{Deserialize, Serialize};

use super::codes::KeyCode;
use crate::domain::modifiers::ModifierSnapshot;

/// Supported keyboard layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardLayout {
    #[default]
    Qwerty,
    Qwertz,
    Azerty,
}

/// Shift-layer symbols of the US layout, shared by all layouts.
const SHIFT_SYMBOLS: &[(char, char)] = &[
    ('1', '!'),
    ('2', '@'),
    ('3', '#'),
    ('4', '$'),
    ('5', '%'),
    ('6', '^'),
    ('7', '&'),
    ('8', '*'),
    ('9', '('),
    ('0', ')'),
    ('-', '_'),
    ('=', '+'),
    ('[', '{'),
    (']', '}'),
    ('\\', '|'),
    (';', ':'),
    ('\'', '"'),
    (',', '<'),
    ('.', '>'),
    ('/', '?'),
    ('`', '~'),
];

const QWERTZ_LETTERS: &[(char, char)] = &[('y', 'z'), ('z', 'y')];

const AZERTY_LETTERS: &[(char, char)] = &[('q', 'a'), ('w', 'z'), ('a', 'q'), ('z', 'w')];

impl KeyboardLayout {
    /// Parses a layout name (`"qwerty"`, `"qwertz"`, `"azerty"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "qwerty" => Some(Self::Qwerty),
            "qwertz" => Some(Self::Qwertz),
            "azerty" => Some(Self::Azerty),
            _ => None,
        }
    }

    /// Returns the layout name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Qwerty => "qwerty",
            Self::Qwertz => "qwertz",
            Self::Azerty => "azerty",
        }
    }

    /// Returns the unshifted character `code` produces on this layout.
    pub fn base_char(self, code: KeyCode) -> Option<char> {
        let base = code.base_char()?;
        let remap = match self {
            Self::Qwerty => &[][..],
            Self::Qwertz => QWERTZ_LETTERS,
            Self::Azerty => AZERTY_LETTERS,
        };
        Some(lookup(remap, base).unwrap_or(base))
    }

    /// Returns the shift-layer symbol for `base`, if it has one.
    pub fn shift_symbol(self, base: char) -> Option<char> {
        lookup(SHIFT_SYMBOLS, base)
    }

    /// Resolves the character `code` produces under `snapshot`.
    ///
    /// Returns `None` for keys that produce no character on the main block.
    pub fn resolve_char(self, code: KeyCode, snapshot: &ModifierSnapshot) -> Option<char> {
        let base = self.base_char(code)?;
        let shift = snapshot.modifiers.shift;
        if base.is_ascii_alphabetic() {
            if shift != snapshot.locks.caps_lock {
                return Some(base.to_ascii_uppercase());
            }
            return Some(base);
        }
        if shift {
            return Some(self.shift_symbol(base).unwrap_or(base));
        }
        Some(base)
    }
}

fn lookup(table: &[(char, char)], key: char) -> Option<char> {
    table.iter().find(|(from, _)| *from == key).map(|(_, to)| *to)
}
