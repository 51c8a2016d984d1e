//! Key identification, classification and character resolution.
//!
//! Input arrives as a key identifier string: either a DOM code (`"KeyA"`,
//! `"Numpad5"`) from a physical keyboard, or the legend of an on-screen key
//! (`"a"`, `"5"`, `"Enter"`).  [`Keymap::identify`] turns either form into a
//! [`KeyCode`]; [`classify`] then sorts the key into the class that decides
//! how the panel treats it.

pub mod codes;
pub mod layout;
pub mod numpad;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use codes::KeyCode;
pub use layout::KeyboardLayout;
pub use numpad::{resolve_numpad, NavKey, NumpadOutput};

/// Error returned when a key identifier cannot be mapped to a known key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("unrecognized key identifier: {0:?}")]
    UnknownKey(String),
}

/// A momentary modifier.  Left and right variants collapse into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Shift,
    Ctrl,
    Alt,
    Meta,
}

/// A toggle that survives key release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockKey {
    Caps,
    Num,
    Scroll,
}

/// How the panel treats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Shift/Ctrl/Alt/Meta; updates modifier state on press and release.
    Modifier(Modifier),
    /// Caps/Num/Scroll lock; toggles once per full press.
    Lock(LockKey),
    /// Control and navigation keys that produce no character.
    Special,
    /// Main-block key producing a character (letters, digits, punctuation, space).
    Character,
    /// Numpad digit, decimal or operator; output depends on NumLock.
    Numpad,
}

impl KeyClass {
    /// Returns `true` if holding the key may start auto-repeat.
    ///
    /// Modifiers, lock toggles and the Enter keys never repeat.
    pub fn is_repeatable(self, code: KeyCode) -> bool {
        match self {
            KeyClass::Modifier(_) | KeyClass::Lock(_) => false,
            KeyClass::Special => !matches!(code, KeyCode::Enter | KeyCode::NumpadEnter),
            KeyClass::Character | KeyClass::Numpad => true,
        }
    }
}

/// Classifies a key.
pub fn classify(code: KeyCode) -> KeyClass {
    match code {
        KeyCode::ShiftLeft | KeyCode::ShiftRight => KeyClass::Modifier(Modifier::Shift),
        KeyCode::ControlLeft | KeyCode::ControlRight => KeyClass::Modifier(Modifier::Ctrl),
        KeyCode::AltLeft | KeyCode::AltRight => KeyClass::Modifier(Modifier::Alt),
        KeyCode::MetaLeft | KeyCode::MetaRight => KeyClass::Modifier(Modifier::Meta),
        KeyCode::CapsLock => KeyClass::Lock(LockKey::Caps),
        KeyCode::NumLock => KeyClass::Lock(LockKey::Num),
        KeyCode::ScrollLock => KeyClass::Lock(LockKey::Scroll),
        KeyCode::NumpadEnter => KeyClass::Special,
        code if code.is_numpad() => KeyClass::Numpad,
        code if code.base_char().is_some() => KeyClass::Character,
        _ => KeyClass::Special,
    }
}

/// Which block single-character legends refer to.
///
/// A numpad panel labels its keys `"7"`, `"+"`, `"Enter"`; those mean the
/// numpad keys, not the main-block ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendBlock {
    #[default]
    MainBlock,
    Numpad,
}

/// Maps key identifiers to [`KeyCode`]s for one panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keymap {
    legends: LegendBlock,
}

impl Keymap {
    /// Creates a keymap resolving legends against `legends`.
    pub fn new(legends: LegendBlock) -> Self {
        Self { legends }
    }

    /// Resolves a key identifier (DOM code or on-screen legend).
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::UnknownKey`] when the identifier matches
    /// neither a known code nor a known legend.
    pub fn identify(&self, key_id: &str) -> Result<KeyCode, ClassifyError> {
        if self.legends == LegendBlock::Numpad {
            if let Some(code) = numpad::code_for_legend(key_id) {
                return Ok(code);
            }
        }
        if let Some(code) = KeyCode::from_code(key_id).or_else(|| legend_alias(key_id)) {
            return Ok(code);
        }
        let mut chars = key_id.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if let Some(code) = KeyCode::from_base_char(ch) {
                return Ok(code);
            }
        }
        Err(ClassifyError::UnknownKey(key_id.to_string()))
    }
}

/// Key names printed on on-screen keys that are not DOM codes.
fn legend_alias(legend: &str) -> Option<KeyCode> {
    let code = match legend {
        "Shift" => KeyCode::ShiftLeft,
        "Control" | "Ctrl" => KeyCode::ControlLeft,
        "Alt" => KeyCode::AltLeft,
        "Meta" | "Win" | "Cmd" => KeyCode::MetaLeft,
        "Esc" => KeyCode::Escape,
        "Caps" => KeyCode::CapsLock,
        "Del" => KeyCode::Delete,
        "Ins" => KeyCode::Insert,
        "PgUp" => KeyCode::PageUp,
        "PgDn" => KeyCode::PageDown,
        _ => return None,
    };
    Some(code)
}
