//! Normalized input events.
//!
//! Every local input, whatever surface it came from, becomes one of these
//! records before it reaches the relay.  Events are built once and never
//! mutated: the modifier and lock flags they carry are the snapshot taken at
//! the moment the event was created.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::modifiers::{LockState, ModifierSnapshot, Modifiers};

/// What happened to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAction {
    Press,
    Release,
    /// Synthetic press emitted by the repeat scheduler.
    Repeat,
    /// Bulk text submission; the text travels in `payload`.
    #[serde(rename = "input")]
    TextInput,
}

impl KeyAction {
    /// Wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            KeyAction::Press => "press",
            KeyAction::Release => "release",
            KeyAction::Repeat => "repeat",
            KeyAction::TextInput => "input",
        }
    }
}

/// A key or text event addressed to a remote target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Panel identity.
    pub device_id: String,
    /// Logical key or produced character (`"a"`, `"A"`, `"Enter"`, `"Home"`).
    pub key: String,
    /// Physical key identifier, when the event came from a physical key.
    pub code: Option<String>,
    pub action: KeyAction,
    pub modifiers: Modifiers,
    pub locks: LockState,
    /// Remote device or session the event is addressed to.
    pub target: String,
    /// Send time, milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Bulk text for [`KeyAction::TextInput`].
    pub payload: Option<String>,
}

impl InputEvent {
    /// Builds a key event carrying `snapshot`.
    pub fn key(
        device_id: impl Into<String>,
        target: impl Into<String>,
        key: impl Into<String>,
        code: Option<String>,
        action: KeyAction,
        snapshot: ModifierSnapshot,
        timestamp: u64,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            key: key.into(),
            code,
            action,
            modifiers: snapshot.modifiers,
            locks: snapshot.locks,
            target: target.into(),
            timestamp,
            payload: None,
        }
    }

    /// Builds a text-input event whose key is `"input_string"`.
    pub fn text(
        device_id: impl Into<String>,
        target: impl Into<String>,
        text: impl Into<String>,
        snapshot: ModifierSnapshot,
        timestamp: u64,
    ) -> Self {
        Self {
            payload: Some(text.into()),
            ..Self::key(
                device_id,
                target,
                TEXT_INPUT_KEY,
                None,
                KeyAction::TextInput,
                snapshot,
                timestamp,
            )
        }
    }

    /// The modifier and lock state this event was built with.
    pub fn snapshot(&self) -> ModifierSnapshot {
        ModifierSnapshot {
            modifiers: self.modifiers,
            locks: self.locks,
        }
    }
}

/// Returns the current time as milliseconds since the Unix epoch.
pub fn current_timestamp_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Key name used for bulk text submissions.
pub const TEXT_INPUT_KEY: &str = "input_string";

/// Phase of a touch contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Start,
    Move,
    End,
}

impl TouchPhase {
    /// Wire message type for this phase.
    pub fn wire_type(self) -> &'static str {
        match self {
            TouchPhase::Start => "touch_start",
            TouchPhase::Move => "touch_move",
            TouchPhase::End => "touch_end",
        }
    }
}

/// A touch or pointer contact update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub device_id: String,
    /// `"mouse"` for pointer input, the finger identifier otherwise.
    pub touch_id: String,
    pub phase: TouchPhase,
    /// Position after sensitivity scaling.
    pub x: f64,
    pub y: f64,
    /// 0.0..=1.0
    pub pressure: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Anything the relay can forward.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    Key(InputEvent),
    Touch(TouchEvent),
}

impl RelayEvent {
    pub fn timestamp(&self) -> u64 {
        match self {
            RelayEvent::Key(e) => e.timestamp,
            RelayEvent::Touch(e) => e.timestamp,
        }
    }

    /// One-line description for the diagnostics log.
    pub fn describe(&self) -> String {
        match self {
            RelayEvent::Key(e) if e.action == KeyAction::TextInput => format!(
                "input {:?} -> {}",
                e.payload.as_deref().unwrap_or_default(),
                e.target
            ),
            RelayEvent::Key(e) => format!("{} {} -> {}", e.action.as_str(), e.key, e.target),
            RelayEvent::Touch(e) => format!(
                "{} #{} ({:.0}, {:.0}) P:{:.2}",
                e.phase.wire_type(),
                e.touch_id,
                e.x,
                e.y,
                e.pressure
            ),
        }
    }
}

impl From<InputEvent> for RelayEvent {
    fn from(event: InputEvent) -> Self {
        RelayEvent::Key(event)
    }
}

impl From<TouchEvent> for RelayEvent {
    fn from(event: TouchEvent) -> Self {
        RelayEvent::Touch(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shifted() -> ModifierSnapshot {
        ModifierSnapshot {
            modifiers: Modifiers {
                shift: true,
                ..Default::default()
            },
            locks: LockState::default(),
        }
    }

    #[test]
    fn test_key_event_copies_snapshot() {
        // Arrange / Act
        let event = InputEvent::key(
            "hmi-keyboard",
            "rpi3pc",
            "A",
            Some("KeyA".to_string()),
            KeyAction::Press,
            shifted(),
            1_700_000_000_000,
        );

        // Assert
        assert!(event.modifiers.shift);
        assert!(event.locks.num_lock);
        assert_eq!(event.snapshot(), shifted());
        assert_eq!(event.payload, None);
    }

    #[test]
    fn test_text_event_uses_input_string_key_and_payload() {
        let event = InputEvent::text("hmi-numpad", "rpi3pc", "12+3", shifted(), 42);

        assert_eq!(event.key, TEXT_INPUT_KEY);
        assert_eq!(event.action, KeyAction::TextInput);
        assert_eq!(event.payload.as_deref(), Some("12+3"));
        assert_eq!(event.code, None);
    }

    #[test]
    fn test_current_timestamp_is_after_2024() {
        assert!(current_timestamp_ms() > 1_704_067_200_000);
    }

    #[test]
    fn test_action_wire_names() {
        assert_eq!(KeyAction::Press.as_str(), "press");
        assert_eq!(KeyAction::Release.as_str(), "release");
        assert_eq!(KeyAction::Repeat.as_str(), "repeat");
        assert_eq!(KeyAction::TextInput.as_str(), "input");
        assert_eq!(
            serde_json::to_string(&KeyAction::TextInput).expect("serialize"),
            "\"input\""
        );
    }

    #[test]
    fn test_touch_phase_wire_types() {
        assert_eq!(TouchPhase::Start.wire_type(), "touch_start");
        assert_eq!(TouchPhase::Move.wire_type(), "touch_move");
        assert_eq!(TouchPhase::End.wire_type(), "touch_end");
    }

    #[test]
    fn test_describe_key_and_touch_events() {
        // Arrange
        let key = RelayEvent::from(InputEvent::key(
            "kb",
            "rpi3pc",
            "a",
            None,
            KeyAction::Repeat,
            ModifierSnapshot::default(),
            1,
        ));
        let touch = RelayEvent::from(TouchEvent {
            device_id: "pad".to_string(),
            touch_id: "0".to_string(),
            phase: TouchPhase::Start,
            x: 10.4,
            y: 20.6,
            pressure: 0.5,
            timestamp: 2,
        });

        // Act / Assert
        assert_eq!(key.describe(), "repeat a -> rpi3pc");
        assert_eq!(touch.describe(), "touch_start #0 (10, 21) P:0.50");
        assert_eq!(touch.timestamp(), 2);
    }
}
