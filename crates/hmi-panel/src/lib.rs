//! hmi-panel library crate.
//!
//! Runs one HMI virtual panel (keyboard, numpad or touchpad) without a
//! browser: input arrives through a presentation binding, is turned into
//! events by `hmi-core`, and is relayed to the panel backend over a
//! WebSocket that reconnects forever.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! presentation binding (stdin commands, or a UI)
//!         ↓ UiCommand
//! [hmi-panel]
//!   ├── domain/           Pure types: PanelConfig, ConfigProvider, ConnectionState
//!   ├── application/      PanelController (input capture), EventRelay, PanelObserver
//!   └── infrastructure/
//!         ├── transport/  TransportClient reconnect state machine
//!         ├── websocket/  tokio-tungstenite Connector
//!         ├── event_loop/ single-task select! loop tying it together
//!         └── stdin_binding/ line commands → UiCommand
//!         ↓ JSON text frames
//! panel backend
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `hmi-core` only.  It talks to the
//!   connection through the [`application::EventSink`] trait.
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tungstenite`.
//!
//! # For beginners: one task, no locks
//!
//! All panel state is owned by a single async task (see
//! [`infrastructure::run_panel`]).  Input commands, repeat ticks, connection
//! changes and the stats timer are multiplexed with `tokio::select!`, so the
//! state is never shared between threads and needs no `Mutex`.

/// Domain layer: configuration and connection status types (no I/O).
pub mod domain;

/// Application layer: input capture, relay and observer seam.
pub mod application;

/// Infrastructure layer: transport, WebSocket connector and event loop.
pub mod infrastructure;
