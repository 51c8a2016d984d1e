//! Connection status of a panel's transport.

use std::fmt;

/// State of the transport connection.
///
/// ```text
/// Disconnected ──connect()──► Connecting ──ok──► Connected
///      ▲                          │                  │
///      │                        fail               close
///      │                          ▼                  │
///      └──── retry delay ────── Error ◄──────────────┘ (via Disconnected)
/// ```
///
/// There is no terminal state: a panel keeps retrying for as long as it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    /// Text for the operator's status indicator.
    pub fn status_text(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Connected => "Connected",
            ConnectionState::Error => "Connection Error",
        }
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_only_connected_reports_connected() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(!ConnectionState::Disconnected.is_connected());
        assert!(!ConnectionState::Error.is_connected());
    }

    #[test]
    fn test_display_uses_status_text() {
        assert_eq!(ConnectionState::Error.to_string(), "Connection Error");
        assert_eq!(ConnectionState::Connecting.to_string(), "Connecting...");
    }
}
