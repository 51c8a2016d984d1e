//! Physical key identifiers.
//!
//! The canonical identifier for a physical key is its DOM `KeyboardEvent.code`
//! string (`"KeyA"`, `"Numpad5"`, `"ShiftLeft"`, ...).  Panels receive these
//! from physical keyboard listeners, and on-screen keys carry the same value
//! in their bindings.  [`KeyCode`] is the typed form of that string.
//!
//! # Why DOM codes and not characters? (for beginners)
//!
//! A code names a *position* on the keyboard, not the character it produces.
//! `KeyA` is the key to the right of CapsLock; whether it types `a`, `A` or
//! `q` depends on the modifier state and the active layout.  Keeping the code
//! separate from the resolved character lets the relay send both: the remote
//! side can replay the physical key or just insert the character.
//!
//! Each variant also carries its USB HID Usage ID (page 0x07) as the enum
//! discriminant, which backends that inject HID reports can use directly.

use serde::{Deserialize, Serialize};

/// A physical key on a keyboard or numeric pad.
///
/// The numeric value of each variant is its HID Usage ID on the keyboard/keypad page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum KeyCode {
    // Letters
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    // Digits
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Control and punctuation
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    BracketLeft = 0x2F,
    BracketRight = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Backquote = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,

    CapsLock = 0x39,

    // Function keys
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation cluster
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    ArrowRight = 0x4F,
    ArrowLeft = 0x50,
    ArrowDown = 0x51,
    ArrowUp = 0x52,

    // Numeric pad
    NumLock = 0x53,
    NumpadDivide = 0x54,
    NumpadMultiply = 0x55,
    NumpadSubtract = 0x56,
    NumpadAdd = 0x57,
    NumpadEnter = 0x58,
    Numpad1 = 0x59,
    Numpad2 = 0x5A,
    Numpad3 = 0x5B,
    Numpad4 = 0x5C,
    Numpad5 = 0x5D,
    Numpad6 = 0x5E,
    Numpad7 = 0x5F,
    Numpad8 = 0x60,
    Numpad9 = 0x61,
    Numpad0 = 0x62,
    NumpadDecimal = 0x63,

    ContextMenu = 0x65,

    // Modifiers
    ControlLeft = 0xE0,
    ShiftLeft = 0xE1,
    AltLeft = 0xE2,
    MetaLeft = 0xE3,
    ControlRight = 0xE4,
    ShiftRight = 0xE5,
    AltRight = 0xE6,
    MetaRight = 0xE7,
}

/// Code string and unshifted character for every [`KeyCode`].
///
/// The character column is the base (unshifted, QWERTY) output of
/// character-producing keys on the main block.  Numpad keys have no entry
/// here: their output depends on NumLock and is resolved in
/// [`numpad`](super::numpad).
const KEY_TABLE: &[(KeyCode, &str, Option<char>)] = &[
    (KeyCode::KeyA, "KeyA", Some('a')),
    (KeyCode::KeyB, "KeyB", Some('b')),
    (KeyCode::KeyC, "KeyC", Some('c')),
    (KeyCode::KeyD, "KeyD", Some('d')),
    (KeyCode::KeyE, "KeyE", Some('e')),
    (KeyCode::KeyF, "KeyF", Some('f')),
    (KeyCode::KeyG, "KeyG", Some('g')),
    (KeyCode::KeyH, "KeyH", Some('h')),
    (KeyCode::KeyI, "KeyI", Some('i')),
    (KeyCode::KeyJ, "KeyJ", Some('j')),
    (KeyCode::KeyK, "KeyK", Some('k')),
    (KeyCode::KeyL, "KeyL", Some('l')),
    (KeyCode::KeyM, "KeyM", Some('m')),
    (KeyCode::KeyN, "KeyN", Some('n')),
    (KeyCode::KeyO, "KeyO", Some('o')),
    (KeyCode::KeyP, "KeyP", Some('p')),
    (KeyCode::KeyQ, "KeyQ", Some('q')),
    (KeyCode::KeyR, "KeyR", Some('r')),
    (KeyCode::KeyS, "KeyS", Some('s')),
    (KeyCode::KeyT, "KeyT", Some('t')),
    (KeyCode::KeyU, "KeyU", Some('u')),
    (KeyCode::KeyV, "KeyV", Some('v')),
    (KeyCode::KeyW, "KeyW", Some('w')),
    (KeyCode::KeyX, "KeyX", Some('x')),
    (KeyCode::KeyY, "KeyY", Some('y')),
    (KeyCode::KeyZ, "KeyZ", Some('z')),
    (KeyCode::Digit1, "Digit1", Some('1')),
    (KeyCode::Digit2, "Digit2", Some('2')),
    (KeyCode::Digit3, "Digit3", Some('3')),
    (KeyCode::Digit4, "Digit4", Some('4')),
    (KeyCode::Digit5, "Digit5", Some('5')),
    (KeyCode::Digit6, "Digit6", Some('6')),
    (KeyCode::Digit7, "Digit7", Some('7')),
    (KeyCode::Digit8, "Digit8", Some('8')),
    (KeyCode::Digit9, "Digit9", Some('9')),
    (KeyCode::Digit0, "Digit0", Some('0')),
    (KeyCode::Enter, "Enter", None),
    (KeyCode::Escape, "Escape", None),
    (KeyCode::Backspace, "Backspace", None),
    (KeyCode::Tab, "Tab", None),
    (KeyCode::Space, "Space", Some(' ')),
    (KeyCode::Minus, "Minus", Some('-')),
    (KeyCode::Equal, "Equal", Some('=')),
    (KeyCode::BracketLeft, "BracketLeft", Some('[')),
    (KeyCode::BracketRight, "BracketRight", Some(']')),
    (KeyCode::Backslash, "Backslash", Some('\\')),
    (KeyCode::Semicolon, "Semicolon", Some(';')),
    (KeyCode::Quote, "Quote", Some('\'')),
    (KeyCode::Backquote, "Backquote", Some('`')),
    (KeyCode::Comma, "Comma", Some(',')),
    (KeyCode::Period, "Period", Some('.')),
    (KeyCode::Slash, "Slash", Some('/')),
    (KeyCode::CapsLock, "CapsLock", None),
    (KeyCode::F1, "F1", None),
    (KeyCode::F2, "F2", None),
    (KeyCode::F3, "F3", None),
    (KeyCode::F4, "F4", None),
    (KeyCode::F5, "F5", None),
    (KeyCode::F6, "F6", None),
    (KeyCode::F7, "F7", None),
    (KeyCode::F8, "F8", None),
    (KeyCode::F9, "F9", None),
    (KeyCode::F10, "F10", None),
    (KeyCode::F11, "F11", None),
    (KeyCode::F12, "F12", None),
    (KeyCode::PrintScreen, "PrintScreen", None),
    (KeyCode::ScrollLock, "ScrollLock", None),
    (KeyCode::Pause, "Pause", None),
    (KeyCode::Insert, "Insert", None),
    (KeyCode::Home, "Home", None),
    (KeyCode::PageUp, "PageUp", None),
    (KeyCode::Delete, "Delete", None),
    (KeyCode::End, "End", None),
    (KeyCode::PageDown, "PageDown", None),
    (KeyCode::ArrowRight, "ArrowRight", None),
    (KeyCode::ArrowLeft, "ArrowLeft", None),
    (KeyCode::ArrowDown, "ArrowDown", None),
    (KeyCode::ArrowUp, "ArrowUp", None),
    (KeyCode::NumLock, "NumLock", None),
    (KeyCode::NumpadDivide, "NumpadDivide", None),
    (KeyCode::NumpadMultiply, "NumpadMultiply", None),
    (KeyCode::NumpadSubtract, "NumpadSubtract", None),
    (KeyCode::NumpadAdd, "NumpadAdd", None),
    (KeyCode::NumpadEnter, "NumpadEnter", None),
    (KeyCode::Numpad1, "Numpad1", None),
    (KeyCode::Numpad2, "Numpad2", None),
    (KeyCode::Numpad3, "Numpad3", None),
    (KeyCode::Numpad4, "Numpad4", None),
    (KeyCode::Numpad5, "Numpad5", None),
    (KeyCode::Numpad6, "Numpad6", None),
    (KeyCode::Numpad7, "Numpad7", None),
    (KeyCode::Numpad8, "Numpad8", None),
    (KeyCode::Numpad9, "Numpad9", None),
    (KeyCode::Numpad0, "Numpad0", None),
    (KeyCode::NumpadDecimal, "NumpadDecimal", None),
    (KeyCode::ContextMenu, "ContextMenu", None),
    (KeyCode::ControlLeft, "ControlLeft", None),
    (KeyCode::ShiftLeft, "ShiftLeft", None),
    (KeyCode::AltLeft, "AltLeft", None),
    (KeyCode::MetaLeft, "MetaLeft", None),
    (KeyCode::ControlRight, "ControlRight", None),
    (KeyCode::ShiftRight, "ShiftRight", None),
    (KeyCode::AltRight, "AltRight", None),
    (KeyCode::MetaRight, "MetaRight", None),
];

impl KeyCode {
    /// Parses a DOM `KeyboardEvent.code` string.
    ///
    /// Returns `None` for codes this table does not know.
    pub fn from_code(code: &str) -> Option<Self> {
        KEY_TABLE
            .iter()
            .find(|(_, name, _)| *name == code)
            .map(|(key, _, _)| *key)
    }

    /// Finds the main-block key whose unshifted output is `ch`.
    ///
    /// On-screen keyboard keys are usually labelled with the character they
    /// type (`"a"`, `"1"`, `"-"`); this maps such a legend back to a code.
    pub fn from_base_char(ch: char) -> Option<Self> {
        let lower = ch.to_ascii_lowercase();
        KEY_TABLE
            .iter()
            .find(|(_, _, base)| *base == Some(lower))
            .map(|(key, _, _)| *key)
    }

    /// Returns the DOM `KeyboardEvent.code` string for this key.
    pub fn as_str(self) -> &'static str {
        KEY_TABLE
            .iter()
            .find(|(key, _, _)| *key == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("Unidentified")
    }

    /// Returns the unshifted character of a main-block character key.
    pub fn base_char(self) -> Option<char> {
        KEY_TABLE
            .iter()
            .find(|(key, _, _)| *key == self)
            .and_then(|(_, _, base)| *base)
    }

    /// Returns the USB HID Usage ID (page 0x07) for this key.
    pub fn hid_usage(self) -> u16 {
        self as u16
    }

    /// Returns `true` for keys on the numeric pad, excluding NumLock itself.
    pub fn is_numpad(self) -> bool {
        self.as_str().starts_with("Numpad")
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_entry_parses_back_to_itself() {
        for &(key, name, _) in KEY_TABLE {
            // Arrange / Act
            let parsed = KeyCode::from_code(name);

            // Assert
            assert_eq!(parsed, Some(key), "from_code({name}) should produce {key:?}");
            assert_eq!(key.as_str(), name);
        }
    }

    #[test]
    fn test_unknown_code_string_returns_none() {
        assert_eq!(KeyCode::from_code("Hyper"), None);
        assert_eq!(KeyCode::from_code(""), None);
        // Codes are case-sensitive, like the DOM.
        assert_eq!(KeyCode::from_code("keya"), None);
    }

    #[test]
    fn test_from_base_char_maps_legends_to_main_block() {
        assert_eq!(KeyCode::from_base_char('a'), Some(KeyCode::KeyA));
        assert_eq!(KeyCode::from_base_char('A'), Some(KeyCode::KeyA));
        assert_eq!(KeyCode::from_base_char('5'), Some(KeyCode::Digit5));
        assert_eq!(KeyCode::from_base_char(' '), Some(KeyCode::Space));
        assert_eq!(KeyCode::from_base_char('/'), Some(KeyCode::Slash));
        assert_eq!(KeyCode::from_base_char('€'), None);
    }

    #[test]
    fn test_hid_usage_matches_discriminant() {
        assert_eq!(KeyCode::KeyA.hid_usage(), 0x04);
        assert_eq!(KeyCode::Enter.hid_usage(), 0x28);
        assert_eq!(KeyCode::Numpad5.hid_usage(), 0x5D);
        assert_eq!(KeyCode::MetaRight.hid_usage(), 0xE7);
    }

    #[test]
    fn test_is_numpad_excludes_numlock() {
        assert!(KeyCode::Numpad0.is_numpad());
        assert!(KeyCode::NumpadEnter.is_numpad());
        assert!(!KeyCode::NumLock.is_numpad());
        assert!(!KeyCode::Digit0.is_numpad());
    }

    #[test]
    fn test_display_uses_code_string() {
        assert_eq!(KeyCode::ArrowUp.to_string(), "ArrowUp");
    }
}
