//! Domain entities for the HMI input relay.
//!
//! This module contains pure state and value types with no I/O.
//!
//! # What lives here? (for beginners)
//!
//! A virtual panel turns "the operator touched something" into "a message
//! went to the remote target".  The pieces of state that sit in between are
//! all plain Rust values defined in this module:
//!
//! - **`event`** – The normalized records that leave the panel
//!   ([`InputEvent`] for keys and text, [`TouchEvent`] for touch points).
//! - **`modifiers`** – The Shift/Ctrl/Alt/Meta and Caps/Num/Scroll lock
//!   state machine and its immutable [`ModifierSnapshot`].
//! - **`pressed`** – The set of keys currently held down, used to ignore
//!   duplicate key-down signals.
//! - **`echo`** – The local text buffer that mirrors what was typed.
//! - **`touch`** – Active touch points for touchpad panels.
//!
//! Nothing here knows about sockets, timers or threads, so every type can be
//! tested with ordinary `#[test]` functions.

pub mod echo;
pub mod event;
pub mod modifiers;
pub mod pressed;
pub mod touch;

pub use echo::EchoBuffer;
pub use event::{
    current_timestamp_ms, InputEvent, KeyAction, RelayEvent, TouchEvent, TouchPhase, TEXT_INPUT_KEY,
};
pub use modifiers::{LockState, ModifierLockState, ModifierSnapshot, Modifiers};
pub use pressed::PressedKeySet;
pub use touch::{TouchContact, TouchTracker, MOUSE_TOUCH_ID};
