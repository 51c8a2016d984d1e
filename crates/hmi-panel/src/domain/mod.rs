//! Domain layer for hmi-panel.
//!
//! Pure types with no dependencies on I/O, networking or the async runtime,
//! so they can be tested in isolation.
//!
//! # What belongs in the domain layer?
//!
//! - Panel configuration and its validation rules
//! - Endpoint resolution from the flat config-provider map
//! - The connection status enum shown to the operator
//!
//! # What does NOT belong here?
//!
//! - Any `tokio` or `WebSocket` types
//! - Reading environment variables (the binary collects them and hands the
//!   map in as a [`ConfigProvider`])

pub mod config;
pub mod status;

pub use config::{ConfigError, ConfigProvider, PanelConfig, PanelKind};
pub use status::ConnectionState;
