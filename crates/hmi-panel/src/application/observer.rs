//! Observer seam between the panel core and its presentation layer.
//!
//! The controller never touches a UI directly.  It reports state changes to a
//! [`PanelObserver`], and a binding (a terminal printer, a GUI, a test) decides
//! how to show them.  Every method has an empty default so a binding only
//! implements what it displays.

use std::time::Duration;

use hmi_core::domain::TouchContact;
use hmi_core::{BackendMessage, ModifierSnapshot};

use crate::domain::ConnectionState;

/// Figures shown in a panel's statistics area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelStats {
    pub uptime: Duration,
    pub keys_pressed: u64,
    pub commands_sent: u64,
    /// Time since the last input, `None` before the first one.
    pub last_activity_age: Option<Duration>,
}

/// Receives state-change notifications from a
/// [`PanelController`](super::PanelController).
#[cfg_attr(test, mockall::automock)]
pub trait PanelObserver: Send {
    /// The status indicator should change.
    fn connection_changed(&mut self, _state: ConnectionState) {}

    /// Modifier or lock state changed (e.g. to light the Caps Lock LED).
    fn modifiers_changed(&mut self, _snapshot: ModifierSnapshot) {}

    /// The local echo buffer changed.
    fn echo_changed(&mut self, _text: &str, _cursor: usize) {}

    /// A key went down (`active = true`) or up.
    fn key_highlight(&mut self, _key: &str, _active: bool) {}

    /// The backend sent a status or acknowledgement message.
    fn backend_message(&mut self, _message: &BackendMessage) {}

    /// Periodic statistics refresh.
    fn stats_updated(&mut self, _stats: &PanelStats) {}

    /// A touch contact started or moved (`active = true`) or lifted.
    fn touch_updated(&mut self, _contact: &TouchContact, _active: bool) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PanelObserver for NoopObserver {}
