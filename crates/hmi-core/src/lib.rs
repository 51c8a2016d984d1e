//! # hmi-core
//!
//! Input relay core for HMI virtual panels (keyboard, numpad, touchpad).
//!
//! This crate turns local key and touch input into normalized events and
//! wire messages.  It has no dependencies on sockets, async runtimes or UI
//! toolkits; the `hmi-panel` crate wires it to a real connection.
//!
//! # Architecture overview (for beginners)
//!
//! A virtual panel is an on-screen keyboard, numpad or touchpad that forwards
//! what the operator does to a remote target machine.  The path of one key
//! press through this crate is:
//!
//! ```text
//! key id ─► keymap (identify + classify) ─► domain (modifier/lock state,
//!           pressed-key set, echo buffer) ─► InputEvent ─► protocol (JSON)
//! ```
//!
//! - **`keymap`** – Key code table, key classes, keyboard layouts and the
//!   NumLock-dependent numpad mapping.
//!
//! - **`domain`** – Plain state types: modifier and lock flags, held keys,
//!   the local echo buffer, active touch points and the event records.
//!
//! - **`repeat`** – Deadline bookkeeping for auto-repeating held keys.  The
//!   caller passes the current time in, so it can be tested with a fake clock.
//!
//! - **`script`** – Timed key combos (Ctrl+C, Alt+Tab) and simulated touch
//!   gestures, played back through the same deadline style as `repeat`.
//!
//! - **`diagnostics`** – The bounded operator log, activity counters and
//!   log export.
//!
//! - **`protocol`** – Per-panel JSON message shapes sent to and received
//!   from the backend.

pub mod diagnostics;
pub mod domain;
pub mod keymap;
pub mod protocol;
pub mod repeat;
pub mod script;

// Re-export the most-used types at the crate root so callers can write
// `hmi_core::InputEvent` instead of `hmi_core::domain::event::InputEvent`.
pub use diagnostics::{ActivityCounters, DiagnosticsLog, DiagnosticsSnapshot, LogEntry};
pub use domain::{
    current_timestamp_ms, EchoBuffer, InputEvent, KeyAction, LockState, ModifierLockState,
    ModifierSnapshot, Modifiers, PressedKeySet, RelayEvent, TouchEvent, TouchPhase, TouchTracker,
};
pub use keymap::{classify, ClassifyError, KeyClass, KeyCode, KeyboardLayout, Keymap, LegendBlock};
pub use protocol::{
    decode_backend_message, encode_event, BackendMessage, SerializationError, WireSchema,
};
pub use repeat::RepeatScheduler;
pub use script::{Gesture, KeyCombo, ScriptAction, ScriptPlayer, TimedStep, TouchStep};
