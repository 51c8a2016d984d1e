//! Infrastructure layer for hmi-panel.
//!
//! The infrastructure layer handles all I/O and all timing: the WebSocket
//! connection to the panel backend, the reconnect timer, key-repeat ticks and
//! the presentation binding.
//!
//! # Responsibilities
//!
//! - Opening WebSocket connections and pumping text frames (`websocket`)
//! - The reconnect state machine: fixed delay, unbounded retries, at most one
//!   attempt in flight (`transport`)
//! - The single-task event loop that owns the controller (`event_loop`)
//! - Parsing operator commands from stdin (`stdin_binding`)
//! - Writing diagnostics snapshots to disk
//!
//! # What does NOT belong here?
//!
//! - Deciding what a key press means (that is the application layer)
//! - Wire message layouts (that is `hmi-core`)
//! - Configuration defaults (that is the domain layer)

pub mod event_loop;
pub mod stdin_binding;
pub mod transport;
pub mod websocket;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use event_loop::{run_panel, write_snapshot, ExportError, ExportPaths, UiCommand};
pub use stdin_binding::{
    forward_commands, parse_command, spawn_stdin_reader, CommandError, ConsoleObserver,
};
pub use transport::{Connector, Link, LinkEvent, TransportClient, TransportEvent};
pub use websocket::WebSocketConnector;
