//! Numeric pad resolution.
//!
//! With NumLock on, numpad keys type digits and operators.  With NumLock off
//! the digit keys act as the navigation keys printed under the digits
//! (7 = Home, 8 = Up, ...), the decimal key acts as Delete, and the operator
//! keys produce nothing.

use super::codes::KeyCode;

/// Navigation key produced by a numpad digit with NumLock off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Home,
    End,
    PageUp,
    PageDown,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Insert,
    Delete,
    /// Numpad 5 without NumLock.
    Clear,
}

impl NavKey {
    /// Logical key name (DOM `KeyboardEvent.key`).
    pub fn as_str(self) -> &'static str {
        match self {
            NavKey::Home => "Home",
            NavKey::End => "End",
            NavKey::PageUp => "PageUp",
            NavKey::PageDown => "PageDown",
            NavKey::ArrowUp => "ArrowUp",
            NavKey::ArrowDown => "ArrowDown",
            NavKey::ArrowLeft => "ArrowLeft",
            NavKey::ArrowRight => "ArrowRight",
            NavKey::Insert => "Insert",
            NavKey::Delete => "Delete",
            NavKey::Clear => "Clear",
        }
    }

    /// The dedicated navigation-cluster key with the same function.
    pub fn as_key_code(self) -> Option<KeyCode> {
        match self {
            NavKey::Home => Some(KeyCode::Home),
            NavKey::End => Some(KeyCode::End),
            NavKey::PageUp => Some(KeyCode::PageUp),
            NavKey::PageDown => Some(KeyCode::PageDown),
            NavKey::ArrowUp => Some(KeyCode::ArrowUp),
            NavKey::ArrowDown => Some(KeyCode::ArrowDown),
            NavKey::ArrowLeft => Some(KeyCode::ArrowLeft),
            NavKey::ArrowRight => Some(KeyCode::ArrowRight),
            NavKey::Insert => Some(KeyCode::Insert),
            NavKey::Delete => Some(KeyCode::Delete),
            NavKey::Clear => None,
        }
    }
}

/// What a numpad key produces under the current NumLock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumpadOutput {
    Char(char),
    Navigation(NavKey),
    /// Operator key with NumLock off.
    Nothing,
}

/// Resolves a numpad key.  Returns `None` for keys outside the numpad
/// digit/operator group.
pub fn resolve_numpad(code: KeyCode, num_lock: bool) -> Option<NumpadOutput> {
    let (ch, nav) = match code {
        KeyCode::Numpad0 => ('0', Some(NavKey::Insert)),
        KeyCode::Numpad1 => ('1', Some(NavKey::End)),
        KeyCode::Numpad2 => ('2', Some(NavKey::ArrowDown)),
        KeyCode::Numpad3 => ('3', Some(NavKey::PageDown)),
        KeyCode::Numpad4 => ('4', Some(NavKey::ArrowLeft)),
        KeyCode::Numpad5 => ('5', Some(NavKey::Clear)),
        KeyCode::Numpad6 => ('6', Some(NavKey::ArrowRight)),
        KeyCode::Numpad7 => ('7', Some(NavKey::Home)),
        KeyCode::Numpad8 => ('8', Some(NavKey::ArrowUp)),
        KeyCode::Numpad9 => ('9', Some(NavKey::PageUp)),
        KeyCode::NumpadDecimal => ('.', Some(NavKey::Delete)),
        KeyCode::NumpadAdd => ('+', None),
        KeyCode::NumpadSubtract => ('-', None),
        KeyCode::NumpadMultiply => ('*', None),
        KeyCode::NumpadDivide => ('/', None),
        _ => return None,
    };
    if num_lock {
        return Some(NumpadOutput::Char(ch));
    }
    Some(nav.map_or(NumpadOutput::Nothing, NumpadOutput::Navigation))
}

/// Maps an on-screen numpad legend to its key.
pub(crate) fn code_for_legend(legend: &str) -> Option<KeyCode> {
    let code = match legend {
        "0" => KeyCode::Numpad0,
        "1" => KeyCode::Numpad1,
        "2" => KeyCode::Numpad2,
        "3" => KeyCode::Numpad3,
        "4" => KeyCode::Numpad4,
        "5" => KeyCode::Numpad5,
        "6" => KeyCode::Numpad6,
        "7" => KeyCode::Numpad7,
        "8" => KeyCode::Numpad8,
        "9" => KeyCode::Numpad9,
        "." => KeyCode::NumpadDecimal,
        "+" => KeyCode::NumpadAdd,
        "-" => KeyCode::NumpadSubtract,
        "*" => KeyCode::NumpadMultiply,
        "/" => KeyCode::NumpadDivide,
        "Enter" => KeyCode::NumpadEnter,
        _ => return None,
    };
    Some(code)
}

/// Returns `true` for characters a numpad can type.
pub fn is_numpad_printable(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '.' | '+' | '-' | '*' | '/')
}
