//! JSON message types exchanged with the panel backends.
//!
//! Every message is one JSON object per WebSocket text frame, with a
//! `"type"` field naming the variant and all other fields flattened into the
//! same object.  Serde's `#[serde(tag = "type")]` handles this for us.
//!
//! # Per-panel schemas
//!
//! The three panel backends expect slightly different shapes:
//!
//! ```json
//! {"type":"key_event","key":"A","code":"KeyA","action":"press","target":"rpi3pc",
//!  "modifiers":{...},"locks":{...},"device":"hmi-keyboard","timestamp":1714555800000}
//! {"type":"key_event","key":"5","code":"Numpad5","action":"press","target":"rpi3pc",
//!  "numlock":true,"timestamp":1714555800000}
//! {"type":"touch_start","x":120,"y":48,"pressure":0.5,"touchId":"0",
//!  "device":"hmi-pad","timestamp":1714555800000}
//! ```
//!
//! [`WireSchema`] selects the shape; [`encode_event`] produces the text.

use serde::{Deserialize, Serialize};

use super::SerializationError;
use crate::domain::event::{InputEvent, KeyAction, RelayEvent, TouchEvent, TouchPhase};
use crate::domain::modifiers::{LockState, Modifiers};

/// Which backend message shape a link speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireSchema {
    /// Key events carry the modifier and lock flags plus the device name.
    Keyboard,
    /// Key events carry only the NumLock flag.
    Numpad,
    /// Touch contacts only.
    Touchpad,
}

// ── Panel → backend ───────────────────────────────────────────────────────────

/// Fields of a `key_event` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEventBody {
    pub key: String,
    /// Physical key code; `null` for on-screen keys without one.
    pub code: Option<String>,
    pub action: KeyAction,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<Modifiers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locks: Option<LockState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numlock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Fields of an `input` (bulk text) message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextInputBody {
    pub key: String,
    pub action: KeyAction,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numlock: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub timestamp: u64,
    /// The submitted text.
    pub data: String,
}

/// Fields of a `touch_start` / `touch_move` / `touch_end` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchBody {
    /// Rounded to whole pixels.
    pub x: i64,
    pub y: i64,
    pub pressure: f64,
    #[serde(rename = "touchId")]
    pub touch_id: String,
    pub device: String,
    pub timestamp: u64,
}

/// A message the panel sends to its backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMessage {
    KeyEvent(KeyEventBody),
    Input(TextInputBody),
    TouchStart(TouchBody),
    TouchMove(TouchBody),
    TouchEnd(TouchBody),
}

/// Converts an event into the message shape of `schema`.
///
/// # Errors
///
/// [`SerializationError::InvalidEvent`] when the event does not fit the
/// schema (a touch on a key link, a key on a touch link), when a text event
/// has no payload, or when touch coordinates are not finite.
pub fn to_wire(event: &RelayEvent, schema: WireSchema) -> Result<WireMessage, SerializationError> {
    match (event, schema) {
        (RelayEvent::Key(e), WireSchema::Keyboard | WireSchema::Numpad) => key_to_wire(e, schema),
        (RelayEvent::Touch(e), WireSchema::Touchpad) => touch_to_wire(e),
        (RelayEvent::Key(_), WireSchema::Touchpad) => Err(SerializationError::InvalidEvent(
            "key event on a touchpad link".to_string(),
        )),
        (RelayEvent::Touch(_), _) => Err(SerializationError::InvalidEvent(
            "touch event on a key link".to_string(),
        )),
    }
}

/// Encodes an event as one JSON text frame.
pub fn encode_event(event: &RelayEvent, schema: WireSchema) -> Result<String, SerializationError> {
    let message = to_wire(event, schema)?;
    serde_json::to_string(&message).map_err(SerializationError::Encode)
}

fn key_to_wire(e: &InputEvent, schema: WireSchema) -> Result<WireMessage, SerializationError> {
    if e.key.is_empty() {
        return Err(SerializationError::InvalidEvent("empty key".to_string()));
    }
    let keyboard = schema == WireSchema::Keyboard;
    let numlock = (!keyboard).then_some(e.locks.num_lock);
    let device = keyboard.then(|| e.device_id.clone());

    if e.action == KeyAction::TextInput {
        let data = e.payload.clone().ok_or_else(|| {
            SerializationError::InvalidEvent("text input without payload".to_string())
        })?;
        return Ok(WireMessage::Input(TextInputBody {
            key: e.key.clone(),
            action: e.action,
            target: e.target.clone(),
            numlock,
            device,
            timestamp: e.timestamp,
            data,
        }));
    }

    Ok(WireMessage::KeyEvent(KeyEventBody {
        key: e.key.clone(),
        code: e.code.clone(),
        action: e.action,
        target: e.target.clone(),
        modifiers: keyboard.then_some(e.modifiers),
        locks: keyboard.then_some(e.locks),
        numlock,
        device,
        timestamp: e.timestamp,
    }))
}

fn touch_to_wire(e: &TouchEvent) -> Result<WireMessage, SerializationError> {
    if !(e.x.is_finite() && e.y.is_finite() && e.pressure.is_finite()) {
        return Err(SerializationError::InvalidEvent(format!(
            "non-finite touch data for contact {}",
            e.touch_id
        )));
    }
    let body = TouchBody {
        x: e.x.round() as i64,
        y: e.y.round() as i64,
        pressure: e.pressure,
        touch_id: e.touch_id.clone(),
        device: e.device_id.clone(),
        timestamp: e.timestamp,
    };
    Ok(match e.phase {
        TouchPhase::Start => WireMessage::TouchStart(body),
        TouchPhase::Move => WireMessage::TouchMove(body),
        TouchPhase::End => WireMessage::TouchEnd(body),
    })
}

// ── Backend → panel ───────────────────────────────────────────────────────────

/// A message received from the backend.
///
/// ```json
/// {"type":"status_update","mqtt_status":"connected","target_status":"online"}
/// {"type":"key_acknowledged","target":"rpi3pc","key":"5"}
/// {"type":"target_status","status":"offline"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendMessage {
    /// Backend health summary; either field may be missing.
    StatusUpdate {
        #[serde(default)]
        mqtt_status: Option<String>,
        #[serde(default)]
        target_status: Option<String>,
    },
    /// The target confirmed it received a key.
    KeyAcknowledged { target: String, key: String },
    /// The target went online or offline.
    TargetStatus { status: String },
    /// Any `type` this panel does not understand.
    #[serde(other)]
    Unknown,
}

/// Parses one incoming text frame.
pub fn decode_backend_message(text: &str) -> Result<BackendMessage, SerializationError> {
    serde_json::from_str(text).map_err(SerializationError::Decode)
}
