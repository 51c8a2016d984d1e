//! Headless presentation binding: stdin lines in, log lines out.
//!
//! Each input line is one command:
//!
//! ```text
//! press <key> [code]         release <key> [code]
//! text <string>              submit            clear-input
//! touch start <id> <x> <y> [force]
//! touch move <id> <x> <y> [force]
//! touch end <id>
//! numlock                    target <name>
//! combo ctrl+c|ctrl+z|alt+tab
//! gesture tap|double-tap|long-press|swipe-left|swipe-right|swipe-up|swipe-down|pinch|zoom
//! repeat on|off              interval <ms>     layout <name>
//! reconnect                  export            clear-log        quit
//! ```
//!
//! Blank lines and lines starting with `#` are skipped, so a script of
//! commands can be piped in.  The binding holds no state of its own.

use std::io::BufRead;
use std::thread;
use std::time::Duration;

use hmi_core::domain::TouchContact;
use hmi_core::{BackendMessage, Gesture, KeyCombo, KeyboardLayout, ModifierSnapshot};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::event_loop::UiCommand;
use crate::application::{PanelObserver, PanelStats};
use crate::domain::ConnectionState;

/// A line that is not a valid command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("'{command}' expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("invalid value '{value}' for {what}")]
    InvalidValue { what: &'static str, value: String },
}

/// Parses one line.  Returns `Ok(None)` for blank and comment lines.
pub fn parse_command(line: &str) -> Result<Option<UiCommand>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let command = match word.to_ascii_lowercase().as_str() {
        "press" | "release" => {
            let key = args.next().ok_or(CommandError::MissingArgument {
                command: "press/release",
                expected: "<key> [code]",
            })?;
            let key = key.to_string();
            let code = args.next().map(str::to_string);
            if word.eq_ignore_ascii_case("press") {
                UiCommand::Press { key, code }
            } else {
                UiCommand::Release { key, code }
            }
        }
        "text" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "text",
                    expected: "<string>",
                });
            }
            UiCommand::Text(rest.to_string())
        }
        "submit" => UiCommand::Submit,
        "clear-input" => UiCommand::ClearInput,
        "touch" => parse_touch(&mut args)?,
        "numlock" => UiCommand::ToggleNumLock,
        "target" => {
            let target = args.next().ok_or(CommandError::MissingArgument {
                command: "target",
                expected: "<name>",
            })?;
            UiCommand::SetTarget(target.to_string())
        }
        "repeat" => match args.next() {
            Some("on") => UiCommand::SetKeyRepeat(true),
            Some("off") => UiCommand::SetKeyRepeat(false),
            Some(other) => {
                return Err(CommandError::InvalidValue {
                    what: "repeat",
                    value: other.to_string(),
                })
            }
            None => {
                return Err(CommandError::MissingArgument {
                    command: "repeat",
                    expected: "on|off",
                })
            }
        },
        "interval" => {
            let ms = args.next().ok_or(CommandError::MissingArgument {
                command: "interval",
                expected: "<ms>",
            })?;
            match ms.parse::<u64>() {
                Ok(ms) if ms > 0 => UiCommand::SetRepeatInterval(Duration::from_millis(ms)),
                _ => {
                    return Err(CommandError::InvalidValue {
                        what: "interval",
                        value: ms.to_string(),
                    })
                }
            }
        }
        "layout" => {
            let name = args.next().ok_or(CommandError::MissingArgument {
                command: "layout",
                expected: "qwerty|qwertz|azerty",
            })?;
            let layout = KeyboardLayout::from_name(name).ok_or_else(|| CommandError::InvalidValue {
                what: "layout",
                value: name.to_string(),
            })?;
            UiCommand::SetLayout(layout)
        }
        "combo" => {
            let name = args.next().ok_or(CommandError::MissingArgument {
                command: "combo",
                expected: "ctrl+c|ctrl+z|alt+tab",
            })?;
            let combo = name.parse::<KeyCombo>().map_err(|_| CommandError::InvalidValue {
                what: "combo",
                value: name.to_string(),
            })?;
            UiCommand::Combo(combo)
        }
        "gesture" => {
            let name = args.next().ok_or(CommandError::MissingArgument {
                command: "gesture",
                expected: "tap|double-tap|long-press|swipe-<dir>|pinch|zoom",
            })?;
            let gesture = name.parse::<Gesture>().map_err(|_| CommandError::InvalidValue {
                what: "gesture",
                value: name.to_string(),
            })?;
            UiCommand::Gesture(gesture)
        }
        "reconnect" => UiCommand::Reconnect,
        "export" => UiCommand::Export,
        "clear-log" => UiCommand::ClearLog,
        "quit" | "exit" => UiCommand::Quit,
        _ => return Err(CommandError::Unknown(word.to_string())),
    };
    Ok(Some(command))
}

fn parse_touch<'a>(args: &mut impl Iterator<Item = &'a str>) -> Result<UiCommand, CommandError> {
    const USAGE: CommandError = CommandError::MissingArgument {
        command: "touch",
        expected: "start|move|end <id> [x y [force]]",
    };
    let phase = args.next().ok_or(USAGE)?;
    let id = args.next().ok_or(USAGE)?.to_string();
    if phase == "end" {
        return Ok(UiCommand::TouchEnd { id });
    }
    let x = parse_coord("x", args.next().ok_or(USAGE)?)?;
    let y = parse_coord("y", args.next().ok_or(USAGE)?)?;
    let force = args.next().map(|f| parse_coord("force", f)).transpose()?;
    match phase {
        "start" => Ok(UiCommand::TouchStart { id, x, y, force }),
        "move" => Ok(UiCommand::TouchMove { id, x, y, force }),
        other => Err(CommandError::InvalidValue {
            what: "touch phase",
            value: other.to_string(),
        }),
    }
}

fn parse_coord(what: &'static str, value: &str) -> Result<f64, CommandError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandError::InvalidValue {
            what,
            value: value.to_string(),
        })
}

/// Parses every line of `reader` and forwards the commands to `tx`.
///
/// Invalid lines are reported and skipped.  Stops at EOF, after `quit`, or
/// when the event loop has gone away.  Must not be called from async code
/// because it uses `blocking_send`.
pub fn forward_commands<R: BufRead>(reader: R, tx: &mpsc::Sender<UiCommand>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("failed to read command input: {e}");
                return;
            }
        };
        match parse_command(&line) {
            Ok(Some(command)) => {
                let quit = command == UiCommand::Quit;
                if tx.blocking_send(command).is_err() || quit {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("{e}"),
        }
    }
    debug!("command input closed");
}

/// Reads commands from stdin on a dedicated thread.
///
/// A plain thread is used instead of `tokio::io::stdin` so that a pending
/// read never holds up runtime shutdown.  When stdin reaches EOF the sender
/// is dropped, which tells the event loop to shut down.
pub fn spawn_stdin_reader(tx: mpsc::Sender<UiCommand>) -> thread::JoinHandle<()> {
    thread::spawn(move || forward_commands(std::io::stdin().lock(), &tx))
}

/// Observer that reports panel state through `tracing`.
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl PanelObserver for ConsoleObserver {
    fn connection_changed(&mut self, state: ConnectionState) {
        info!(target: "hmi_panel::status", "{state}");
    }

    fn modifiers_changed(&mut self, snapshot: ModifierSnapshot) {
        debug!(target: "hmi_panel::status", ?snapshot, "modifiers");
    }

    fn echo_changed(&mut self, text: &str, cursor: usize) {
        info!(target: "hmi_panel::status", cursor, "input: {text:?}");
    }

    fn backend_message(&mut self, message: &BackendMessage) {
        debug!(target: "hmi_panel::status", ?message, "backend");
    }

    fn stats_updated(&mut self, stats: &PanelStats) {
        debug!(
            target: "hmi_panel::status",
            uptime = %hmi_core::diagnostics::format_uptime(stats.uptime),
            keys = stats.keys_pressed,
            commands = stats.commands_sent,
            "stats"
        );
    }

    fn touch_updated(&mut self, contact: &TouchContact, active: bool) {
        debug!(
            target: "hmi_panel::status",
            id = %contact.touch_id,
            x = contact.x,
            y = contact.y,
            active,
            "touch"
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
