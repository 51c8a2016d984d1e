//! EventRelay: serializes events, hands them to the connection and logs the
//! outcome.
//!
//! The relay is the only place where an input event meets the network.  It
//! never returns an error: a control event that cannot be encoded or sent is
//! logged and dropped so the panel stays interactive.

use hmi_core::{encode_event, DiagnosticsLog, RelayEvent, WireSchema};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::domain::ConnectionState;

/// Errors reported by a connection.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("not connected")]
    NotConnected,

    #[error("connection to {endpoint} failed: {reason}")]
    ConnectFailed { endpoint: String, reason: String },

    #[error("connection to {endpoint} timed out after {after_ms} ms")]
    Timeout { endpoint: String, after_ms: u64 },

    #[error("connection closed")]
    Closed,

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Where encoded frames go.
///
/// Implemented by the transport client; tests use a recording double.
pub trait EventSink {
    /// Current connection state.
    fn state(&self) -> ConnectionState;

    /// Queues one text frame.  Only valid while [`ConnectionState::Connected`].
    fn send(&mut self, frame: String) -> Result<(), TransportError>;
}

/// Result of one [`EventRelay::emit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Handed to the connection.
    Sent,
    /// The connection was not up; nothing was sent.
    Dropped,
    /// Encoding or sending failed.
    Failed,
}

/// Counts and forwards outgoing events for one panel.
#[derive(Debug, Clone)]
pub struct EventRelay {
    schema: WireSchema,
    sent: u64,
    dropped: u64,
    failed: u64,
}

impl EventRelay {
    pub fn new(schema: WireSchema) -> Self {
        Self {
            schema,
            sent: 0,
            dropped: 0,
            failed: 0,
        }
    }

    pub fn schema(&self) -> WireSchema {
        self.schema
    }

    /// Encodes `event`, sends it if the connection is up and appends one line
    /// to `log`.
    ///
    /// Delivery is at most once.  Nothing is queued while disconnected.
    pub fn emit(
        &mut self,
        event: &RelayEvent,
        sink: &mut dyn EventSink,
        log: &mut DiagnosticsLog,
    ) -> RelayOutcome {
        let frame = match encode_event(event, self.schema) {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "dropping event that could not be encoded");
                log.append(format!("Error: could not encode {}: {e}", event.describe()));
                self.failed += 1;
                return RelayOutcome::Failed;
            }
        };

        let state = sink.state();
        if !state.is_connected() {
            debug!(%state, "dropping event while not connected");
            log.append(format!("Dropped (not connected): {}", event.describe()));
            self.dropped += 1;
            return RelayOutcome::Dropped;
        }

        match sink.send(frame) {
            Ok(()) => {
                log.append(format!("Sent: {}", event.describe()));
                self.sent += 1;
                RelayOutcome::Sent
            }
            Err(e) => {
                warn!(error = %e, "send failed");
                log.append(format!("Send failed: {} ({e})", event.describe()));
                self.failed += 1;
                RelayOutcome::Failed
            }
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use hmi_core::{InputEvent, KeyAction, ModifierSnapshot};

    // ── Test doubles ──────────────────────────────────────────────────────────

    struct RecordingSink {
        state: ConnectionState,
        frames: Vec<String>,
        should_fail: bool,
    }

    impl RecordingSink {
        fn new(state: ConnectionState) -> Self {
            Self {
                state,
                frames: Vec::new(),
                should_fail: false,
            }
        }
    }

    impl EventSink for RecordingSink {
        fn state(&self) -> ConnectionState {
            self.state
        }

        fn send(&mut self, frame: String) -> Result<(), TransportError> {
            if self.should_fail {
                return Err(TransportError::Closed);
            }
            self.frames.push(frame);
            Ok(())
        }
    }

    fn press(key: &str) -> RelayEvent {
        RelayEvent::Key(InputEvent::key(
            "hmi-keyboard",
            "rpi3pc",
            key,
            Some("KeyA".to_string()),
            KeyAction::Press,
            ModifierSnapshot::default(),
            1_714_555_800_000,
        ))
    }

    #[test]
    fn test_emit_sends_when_connected() {
        // Arrange
        let mut relay = EventRelay::new(WireSchema::Keyboard);
        let mut sink = RecordingSink::new(ConnectionState::Connected);
        let mut log = DiagnosticsLog::default();

        // Act
        let outcome = relay.emit(&press("a"), &mut sink, &mut log);

        // Assert
        assert_eq!(outcome, RelayOutcome::Sent);
        assert_eq!(sink.frames.len(), 1);
        assert!(sink.frames[0].contains("\"type\":\"key_event\""));
        assert_eq!(log.last().map(|e| e.message.as_str()), Some("Sent: press a -> rpi3pc"));
        assert_eq!(relay.sent(), 1);
    }

    #[test]
    fn test_emit_drops_and_logs_when_disconnected() {
        // Arrange
        let mut relay = EventRelay::new(WireSchema::Keyboard);
        let mut sink = RecordingSink::new(ConnectionState::Disconnected);
        let mut log = DiagnosticsLog::default();

        // Act
        let outcome = relay.emit(&press("a"), &mut sink, &mut log);

        // Assert
        assert_eq!(outcome, RelayOutcome::Dropped);
        assert!(sink.frames.is_empty());
        assert_eq!(log.len(), 1);
        assert!(log
            .last()
            .is_some_and(|e| e.message.starts_with("Dropped (not connected)")));
        assert_eq!(relay.dropped(), 1);
    }

    #[test]
    fn test_emit_drops_while_connecting_or_in_error() {
        let mut relay = EventRelay::new(WireSchema::Keyboard);
        let mut log = DiagnosticsLog::default();

        for state in [ConnectionState::Connecting, ConnectionState::Error] {
            let mut sink = RecordingSink::new(state);
            assert_eq!(relay.emit(&press("a"), &mut sink, &mut log), RelayOutcome::Dropped);
        }
    }

    #[test]
    fn test_send_failure_is_logged_not_propagated() {
        // Arrange
        let mut relay = EventRelay::new(WireSchema::Keyboard);
        let mut sink = RecordingSink::new(ConnectionState::Connected);
        sink.should_fail = true;
        let mut log = DiagnosticsLog::default();

        // Act
        let outcome = relay.emit(&press("a"), &mut sink, &mut log);

        // Assert
        assert_eq!(outcome, RelayOutcome::Failed);
        assert!(log.last().is_some_and(|e| e.message.starts_with("Send failed")));
        assert_eq!(relay.failed(), 1);
    }

    #[test]
    fn test_encode_failure_is_logged_not_propagated() {
        // Arrange: a key event cannot travel over the touchpad schema.
        let mut relay = EventRelay::new(WireSchema::Touchpad);
        let mut sink = RecordingSink::new(ConnectionState::Connected);
        let mut log = DiagnosticsLog::default();

        // Act
        let outcome = relay.emit(&press("a"), &mut sink, &mut log);

        // Assert
        assert_eq!(outcome, RelayOutcome::Failed);
        assert!(sink.frames.is_empty());
        assert!(log.last().is_some_and(|e| e.message.starts_with("Error: could not encode")));
    }
}
