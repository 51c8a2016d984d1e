//! The panel event loop.
//!
//! [`run_panel`] owns the [`PanelController`] and the [`TransportClient`] and
//! multiplexes everything that can happen to a panel in one
//! `tokio::select!`:
//!
//! | Source                 | Handler                                   |
//! |------------------------|-------------------------------------------|
//! | UI command channel     | controller input callbacks, controls      |
//! | earliest script step   | `PanelController::on_deadline`            |
//! | or repeat tick         |                                           |
//! | transport              | state change or incoming backend frame    |
//! | 1 s stats interval     | `PanelController::refresh_stats`          |
//!
//! Because a single task owns all state, no `Mutex` is needed.  Ordering
//! inside one handler is therefore exact: a release cancels its repeat timer
//! before the release event is relayed.
//!
//! # Shutdown
//!
//! The loop ends on `UiCommand::Quit`, when the command channel closes, or
//! when the `running` flag is cleared (Ctrl+C).  It then stops all repeats
//! and scripts,
//! writes the diagnostics snapshot to `export_dir` when one is configured,
//! and closes the transport.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hmi_core::{DiagnosticsSnapshot, Gesture, KeyCombo, KeyboardLayout, SerializationError};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use super::transport::{wait_until, Connector, TransportClient, TransportEvent};
use crate::application::{PanelController, PanelObserver};
use crate::domain::PanelConfig;

/// How often statistics are pushed to the observer.
const STATS_INTERVAL: Duration = Duration::from_secs(1);

/// Input and control requests from the presentation binding.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    Press {
        key: String,
        code: Option<String>,
    },
    Release {
        key: String,
        code: Option<String>,
    },
    /// Send arbitrary text as one text-input event.
    Text(String),
    /// Send the echo buffer.
    Submit,
    ClearInput,
    TouchStart {
        id: String,
        x: f64,
        y: f64,
        force: Option<f64>,
    },
    TouchMove {
        id: String,
        x: f64,
        y: f64,
        force: Option<f64>,
    },
    TouchEnd {
        id: String,
    },
    /// Press and release NumLock.
    ToggleNumLock,
    /// Play a key combo (keyboard panel).
    Combo(KeyCombo),
    /// Simulate a gesture at the surface centre (touchpad panel).
    Gesture(Gesture),
    SetTarget(String),
    SetKeyRepeat(bool),
    SetRepeatInterval(Duration),
    SetLayout(KeyboardLayout),
    /// Drop the connection and reconnect after the manual reconnect delay.
    Reconnect,
    /// Write the diagnostics snapshot now.
    Export,
    ClearLog,
    Quit,
}

/// Errors writing a diagnostics snapshot.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialize(#[from] SerializationError),
}

/// Files produced by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub text: PathBuf,
    pub json: PathBuf,
}

/// Writes `snapshot` into `dir` as a `.txt` and a `.json` file named after
/// the export time.  Creates `dir` if needed.
pub fn write_snapshot(dir: &Path, snapshot: &DiagnosticsSnapshot) -> Result<ExportPaths, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let json = snapshot.to_json()?;
    let paths = ExportPaths {
        text: dir.join(snapshot.file_name("txt")),
        json: dir.join(snapshot.file_name("json")),
    };
    for (path, content) in [(&paths.text, snapshot.to_text()), (&paths.json, json)] {
        std::fs::write(path, content).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
    }
    Ok(paths)
}

/// Runs one panel until shutdown and returns the controller in its final
/// state.
///
/// `endpoint` is the resolved WebSocket URL (see
/// [`PanelConfig::resolve_endpoint`]).
pub async fn run_panel(
    config: PanelConfig,
    endpoint: String,
    connector: Arc<dyn Connector>,
    mut commands: mpsc::Receiver<UiCommand>,
    observer: Box<dyn PanelObserver>,
    running: Arc<AtomicBool>,
) -> PanelController {
    let mut controller = PanelController::new(&config, observer, Instant::now().into_std());
    let mut transport = TransportClient::new(
        connector,
        endpoint.clone(),
        config.reconnect_delay(),
        config.connect_timeout(),
    );

    info!(panel = %config.panel, %endpoint, "panel starting");
    controller.log_event(format!("Connecting to {endpoint}"));
    transport.connect();

    let mut stats = time::interval(STATS_INTERVAL);
    stats.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while running.load(Ordering::Relaxed) {
        let deadline = controller.next_deadline().map(Instant::from_std);

        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    info!("command channel closed");
                    break;
                };
                if !apply_command(command, &mut controller, &mut transport, &config) {
                    break;
                }
            }
            _ = wait_until(deadline) => {
                controller.on_deadline(&mut transport, Instant::now().into_std());
            }
            event = transport.next_event() => match event {
                TransportEvent::StateChanged(state) => controller.on_connection_state(state),
                TransportEvent::Incoming(frame) => controller.handle_backend_frame(&frame),
            },
            _ = stats.tick() => {
                controller.refresh_stats(Instant::now().into_std());
            }
        }
    }

    shutdown(&mut controller, &mut transport, &config);
    controller
}

/// Applies one command.  Returns `false` when the loop should stop.
fn apply_command(
    command: UiCommand,
    controller: &mut PanelController,
    transport: &mut TransportClient,
    config: &PanelConfig,
) -> bool {
    let now = Instant::now().into_std();
    match command {
        UiCommand::Press { key, code } => {
            controller.on_press(&key, code.as_deref(), transport, now);
        }
        UiCommand::Release { key, code } => {
            controller.on_release(&key, code.as_deref(), transport);
        }
        UiCommand::Text(text) => {
            controller.send_text(&text, transport);
        }
        UiCommand::Submit => {
            controller.submit_text(transport);
        }
        UiCommand::ClearInput => controller.clear_input(),
        UiCommand::TouchStart { id, x, y, force } => {
            controller.touch_start(&id, x, y, force, transport, now);
        }
        UiCommand::TouchMove { id, x, y, force } => {
            controller.touch_move(&id, x, y, force, transport);
        }
        UiCommand::TouchEnd { id } => {
            controller.touch_end(&id, transport, now);
        }
        UiCommand::ToggleNumLock => {
            controller.on_press("NumLock", Some("NumLock"), transport, now);
            controller.on_release("NumLock", Some("NumLock"), transport);
        }
        UiCommand::Combo(combo) => {
            controller.send_combo(combo, transport, now);
        }
        UiCommand::Gesture(gesture) => {
            controller.simulate_gesture(gesture, transport, now);
        }
        UiCommand::SetTarget(target) => controller.set_target(&target),
        UiCommand::SetKeyRepeat(enabled) => controller.set_key_repeat(enabled),
        UiCommand::SetRepeatInterval(interval) => controller.set_repeat_interval(interval),
        UiCommand::SetLayout(layout) => controller.set_layout(layout),
        UiCommand::Reconnect => {
            controller.log_event("Manual reconnect requested");
            transport.request_reconnect(config.manual_reconnect_delay());
        }
        UiCommand::Export => {
            let dir = config
                .export_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("."));
            export(controller, &dir);
        }
        UiCommand::ClearLog => controller.clear_log(),
        UiCommand::Quit => {
            info!("quit requested");
            return false;
        }
    }
    true
}

fn export(controller: &mut PanelController, dir: &Path) {
    match write_snapshot(dir, &controller.export_snapshot()) {
        Ok(paths) => {
            info!(path = %paths.text.display(), "diagnostics exported");
            controller.record_export(&paths.text);
        }
        Err(e) => {
            warn!(error = %e, "diagnostics export failed");
            controller.log_event(format!("Export failed: {e}"));
        }
    }
}

fn shutdown(controller: &mut PanelController, transport: &mut TransportClient, config: &PanelConfig) {
    controller.shutdown();
    if let Some(dir) = &config.export_dir {
        export(controller, dir);
    }
    transport.close();
    controller.on_connection_state(transport.state());
    info!(panel = %config.panel, "panel stopped");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hmi_core::{ActivityCounters, DiagnosticsLog};

    fn snapshot() -> DiagnosticsSnapshot {
        let mut log = DiagnosticsLog::new(500);
        log.append("Sent: press 5 -> rpi3pc");
        let at = Utc
            .timestamp_opt(1_714_555_800, 0)
            .single()
            .expect("valid time");
        log.snapshot("numpad", &ActivityCounters::default(), at)
    }

    #[test]
    fn test_write_snapshot_creates_text_and_json_files() {
        // Arrange
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("exports");

        // Act
        let paths = write_snapshot(&target, &snapshot()).expect("export succeeds");

        // Assert
        assert_eq!(
            paths.text.file_name().and_then(|n| n.to_str()),
            Some("hmi-numpad-log-2024-05-01T09-30-00.txt")
        );
        let text = std::fs::read_to_string(&paths.text).expect("text file");
        assert!(text.contains("Sent: press 5 -> rpi3pc"));
        let json = std::fs::read_to_string(&paths.json).expect("json file");
        let parsed = DiagnosticsSnapshot::from_json(&json).expect("valid snapshot");
        assert_eq!(parsed, snapshot());
    }

    #[test]
    fn test_write_snapshot_into_a_file_path_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "x").expect("write");

        let result = write_snapshot(&file, &snapshot());

        assert!(matches!(result, Err(ExportError::Io { .. })));
    }
}
