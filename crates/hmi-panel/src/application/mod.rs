//! Application layer for hmi-panel.
//!
//! The application layer knows *what* happens when the operator touches the
//! panel, but not *how* bytes reach the backend.
//!
//! # Responsibilities
//!
//! - Turning raw key and touch input into relayed events (`PanelController`)
//! - Encoding, sending and logging each event (`EventRelay`)
//! - Reporting state changes to the presentation layer (`PanelObserver`)
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or reconnect timers (infrastructure)
//! - Tokio tasks and channels (infrastructure)

pub mod observer;
pub mod panel;
pub mod relay;

pub use observer::{NoopObserver, PanelObserver, PanelStats};
pub use panel::PanelController;
pub use relay::{EventRelay, EventSink, RelayOutcome, TransportError};
