//! HMI panel runtime: entry point.
//!
//! Runs one virtual panel (keyboard, numpad or touchpad) headless.  Operator
//! input is read from stdin, one command per line, and relayed to the panel
//! backend over a WebSocket that reconnects every 3 s until shutdown.
//!
//! # Usage
//!
//! ```text
//! hmi-panel [OPTIONS]
//!
//! Options:
//!   --panel     <KIND>   keyboard | numpad | touchpad [default: keyboard]
//!   --config    <PATH>   TOML configuration file
//!   --endpoint  <URL>    WebSocket URL; overrides the derived endpoint
//!   --target    <NAME>   Remote device the events are addressed to
//!   --device-id <ID>     Identity sent with every event
//!   --export-dir <DIR>   Write the diagnostics log here on exit
//!   --log-level <LEVEL>  Used when RUST_LOG is unset [default: info]
//! ```
//!
//! # Endpoint resolution
//!
//! Without `--endpoint` (or `endpoint` in the config file) the URL is built
//! from the environment:
//!
//! | Panel    | URL                                               |
//! |----------|---------------------------------------------------|
//! | keyboard | `ws://$HOST_DOMAIN:$RPI_API_PORT/ws/keyboard`     |
//! | touchpad | `ws://$HOST_DOMAIN:$RPI_API_PORT/ws/touch`        |
//! | numpad   | `ws://$HOST_DOMAIN:$HMI_NUMPAD_WS_PORT`           |
//!
//! `HOST_DOMAIN` defaults to `localhost`, `RPI_API_PORT` to `4000` and
//! `HMI_NUMPAD_WS_PORT` to `5560`.
//!
//! # Example session
//!
//! ```text
//! $ printf 'press 5\nrelease 5\nsubmit\nquit\n' | hmi-panel --panel numpad
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hmi_panel::domain::{ConfigProvider, PanelConfig, PanelKind};
use hmi_panel::infrastructure::{run_panel, spawn_stdin_reader, ConsoleObserver, WebSocketConnector};

/// Capacity of the stdin → event loop command queue.
const COMMAND_QUEUE_CAPACITY: usize = 64;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Headless HMI virtual panel.
///
/// Reads operator commands from stdin and relays them to the panel backend.
#[derive(Debug, Parser)]
#[command(
    name = "hmi-panel",
    about = "Headless HMI virtual panel: keyboard, numpad or touchpad input relay",
    version
)]
struct Cli {
    /// Panel kind: keyboard, numpad or touchpad.
    ///
    /// Overrides `panel` from the config file.
    #[arg(long, env = "HMI_PANEL")]
    panel: Option<String>,

    /// Path to a TOML configuration file.
    ///
    /// Every key is optional; missing keys take their defaults.
    #[arg(long, env = "HMI_PANEL_CONFIG")]
    config: Option<PathBuf>,

    /// Explicit WebSocket URL, e.g. `ws://10.0.0.2:4000/ws/keyboard`.
    #[arg(long, env = "HMI_PANEL_ENDPOINT")]
    endpoint: Option<String>,

    /// Remote device the events are addressed to.
    #[arg(long, env = "HMI_TARGET")]
    target: Option<String>,

    /// Identity sent with every event.
    #[arg(long, env = "HMI_DEVICE_ID")]
    device_id: Option<String>,

    /// Directory the diagnostics log is exported to on shutdown.
    #[arg(long, env = "HMI_EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info", env = "HMI_LOG_LEVEL")]
    log_level: String,
}

impl Cli {
    /// Builds the [`PanelConfig`]: config file (or defaults) first, then the
    /// command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded, `--panel` names
    /// an unknown panel, or the merged configuration is invalid.
    fn into_panel_config(self) -> anyhow::Result<PanelConfig> {
        let mut config = match &self.config {
            Some(path) => PanelConfig::load(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?,
            None => PanelConfig::default(),
        };

        if let Some(panel) = &self.panel {
            config.panel = panel
                .parse::<PanelKind>()
                .with_context(|| format!("invalid --panel '{panel}'"))?;
        }
        if let Some(endpoint) = self.endpoint {
            config.endpoint = Some(endpoint);
        }
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(device_id) = self.device_id {
            config.device_id = Some(device_id);
        }
        if let Some(dir) = self.export_dir {
            config.export_dir = Some(dir);
        }

        config.validate().context("invalid panel configuration")?;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup (for beginners)
///
/// 1. CLI arguments are parsed with `clap`; every flag can also come from an
///    environment variable.
/// 2. `tracing_subscriber` is initialised.  `RUST_LOG` wins over
///    `--log-level`.
/// 3. The config file and flags are merged into a [`PanelConfig`] and the
///    WebSocket URL is resolved from the process environment.
/// 4. A Ctrl+C handler clears the shared `running` flag.
/// 5. A stdin reader thread starts feeding commands into a channel.
/// 6. [`run_panel`] runs until `quit`, stdin EOF or Ctrl+C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Parse CLI arguments ───────────────────────────────────────────────────
    let cli = Cli::parse();

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = cli.into_panel_config()?;
    let provider = ConfigProvider::from_pairs(std::env::vars());
    let endpoint = config.resolve_endpoint(&provider);

    info!(
        "HMI {} panel starting: device={}, target={}, endpoint={}",
        config.panel,
        config.device_id(),
        config.target,
        endpoint
    );

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    // ── Presentation binding ──────────────────────────────────────────────────
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    // The reader thread is left detached; it ends with the process.
    let _reader = spawn_stdin_reader(command_tx);

    // ── Panel event loop ──────────────────────────────────────────────────────
    let controller = run_panel(
        config,
        endpoint,
        Arc::new(WebSocketConnector::new()),
        command_rx,
        Box::new(ConsoleObserver),
        running,
    )
    .await;

    info!(
        "HMI panel stopped: {} events sent, {} dropped, {} failed",
        controller.relay().sent(),
        controller.relay().dropped(),
        controller.relay().failed()
    );
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("hmi-panel").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_defaults() {
        // Arrange
        let cli = Cli {
            panel: None,
            config: None,
            endpoint: None,
            target: None,
            device_id: None,
            export_dir: None,
            log_level: "info".to_string(),
        };

        // Act
        let config = cli.into_panel_config().unwrap();

        // Assert
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn test_cli_panel_override() {
        let config = cli(&["--panel", "numpad"]).into_panel_config().unwrap();
        assert_eq!(config.panel, PanelKind::Numpad);
        assert_eq!(config.device_id(), "hmi-numpad");
    }

    #[test]
    fn test_cli_unknown_panel_returns_error() {
        let result = cli(&["--panel", "joystick"]).into_panel_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_win_over_config_file() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.toml");
        std::fs::write(
            &path,
            "panel = \"touchpad\"\ntarget = \"plc-1\"\nendpoint = \"ws://file:1/ws/touch\"\n",
        )
        .unwrap();

        // Act
        let config = cli(&[
            "--config",
            path.to_str().unwrap(),
            "--target",
            "plc-2",
            "--device-id",
            "bench-pad",
        ])
        .into_panel_config()
        .unwrap();

        // Assert
        assert_eq!(config.panel, PanelKind::Touchpad);
        assert_eq!(config.target, "plc-2");
        assert_eq!(config.device_id(), "bench-pad");
        assert_eq!(config.endpoint.as_deref(), Some("ws://file:1/ws/touch"));
    }

    #[test]
    fn test_cli_missing_config_file_returns_error() {
        let result = cli(&["--config", "/nonexistent/hmi-panel.toml"]).into_panel_config();
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("failed to load config"));
    }

    #[test]
    fn test_cli_empty_target_is_rejected() {
        let result = cli(&["--target", "  "]).into_panel_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_endpoint_override_is_used() {
        let config = cli(&["--endpoint", "ws://10.0.0.2:4000/ws/keyboard"])
            .into_panel_config()
            .unwrap();
        let endpoint = config.resolve_endpoint(&ConfigProvider::new());
        assert_eq!(endpoint, "ws://10.0.0.2:4000/ws/keyboard");
    }
}
