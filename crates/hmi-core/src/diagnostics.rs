//! Bounded diagnostics log, activity counters and log export.
//!
//! # What is the diagnostics log? (for beginners)
//!
//! Every panel keeps a short, human-readable history of what it did:
//! connections opened and lost, keys relayed, text submitted.  Operators
//! read it on screen and can export it to a file when reporting a problem.
//!
//! The log is a ring buffer: once it holds `capacity` entries, each new
//! entry evicts the oldest one.  Capacity is never below
//! [`MIN_LOG_CAPACITY`], so at least that many recent lines are always
//! available.
//!
//! Every entry is also emitted as a `tracing` event at `info` level under
//! the `hmi_core::diagnostics` target, so the process log and the operator
//! log tell the same story.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::protocol::SerializationError;

/// Smallest capacity the log accepts.
pub const MIN_LOG_CAPACITY: usize = 500;
/// Capacity used when none is configured.
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// One timestamped log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Append-only ring buffer of [`LogEntry`] values.
#[derive(Debug, Clone)]
pub struct DiagnosticsLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for DiagnosticsLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl DiagnosticsLog {
    /// Creates an empty log.  `capacity` is raised to [`MIN_LOG_CAPACITY`]
    /// if smaller.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_LOG_CAPACITY);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a message stamped with the current time.
    pub fn append(&mut self, message: impl Into<String>) {
        self.append_at(Utc::now(), message);
    }

    /// Appends a message with an explicit timestamp.
    pub fn append_at(&mut self, timestamp: DateTime<Utc>, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "hmi_core::diagnostics", "{message}");
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry { timestamp, message });
    }

    /// Removes every entry, then records that the log was cleared.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.append("Event log cleared");
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copies the log and counters into an export snapshot.  Does not
    /// modify the log.
    pub fn snapshot(
        &self,
        panel: &str,
        counters: &ActivityCounters,
        now: DateTime<Utc>,
    ) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            panel: panel.to_string(),
            exported_at: now,
            keys_pressed: counters.keys_pressed,
            commands_sent: counters.commands_sent,
            last_activity: counters.last_activity,
            entries: self.entries.iter().cloned().collect(),
        }
    }
}

// ── Activity counters ─────────────────────────────────────────────────────────

/// Totals shown in the panel's statistics area.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCounters {
    /// Key presses, including synthetic repeats.
    pub keys_pressed: u64,
    /// Bulk text submissions.
    pub commands_sent: u64,
    pub last_activity: Option<DateTime<Utc>>,
}

impl ActivityCounters {
    pub fn record_key_press(&mut self, at: DateTime<Utc>) {
        self.keys_pressed += 1;
        self.last_activity = Some(at);
    }

    pub fn record_command(&mut self, at: DateTime<Utc>) {
        self.commands_sent += 1;
        self.last_activity = Some(at);
    }

    /// Marks activity that is not counted (touch input, releases).
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_activity = Some(at);
    }

    /// Time since the last activity, or `None` if nothing happened yet.
    pub fn activity_age(&self, now: DateTime<Utc>) -> Option<Duration> {
        let last = self.last_activity?;
        Some((now - last).to_std().unwrap_or(Duration::ZERO))
    }
}

// ── Export ────────────────────────────────────────────────────────────────────

/// Everything an export contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsSnapshot {
    pub panel: String,
    pub exported_at: DateTime<Utc>,
    pub keys_pressed: u64,
    pub commands_sent: u64,
    pub last_activity: Option<DateTime<Utc>>,
    pub entries: Vec<LogEntry>,
}

impl DiagnosticsSnapshot {
    /// Pretty-printed JSON form.
    pub fn to_json(&self) -> Result<String, SerializationError> {
        serde_json::to_string_pretty(self).map_err(SerializationError::Encode)
    }

    /// Parses a snapshot previously produced by [`Self::to_json`].
    pub fn from_json(text: &str) -> Result<Self, SerializationError> {
        serde_json::from_str(text).map_err(SerializationError::Decode)
    }

    /// Plain-text form: a short header followed by one `[time] message`
    /// line per entry.
    pub fn to_text(&self) -> String {
        let last_activity = self
            .last_activity
            .map(|at| {
                let age = (self.exported_at - at).to_std().unwrap_or(Duration::ZERO);
                format_activity_age(age)
            })
            .unwrap_or_else(|| "never".to_string());

        let mut out = format!(
            "HMI {} event log\nExported: {}\nKeys pressed: {}\nCommands sent: {}\nLast activity: {}\n\n",
            self.panel,
            self.exported_at.to_rfc3339(),
            self.keys_pressed,
            self.commands_sent,
            last_activity,
        );
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }

    /// File name for the text export, e.g.
    /// `hmi-numpad-log-2024-05-01T09-30-00.txt`.
    pub fn file_name(&self, extension: &str) -> String {
        export_file_name(&self.panel, self.exported_at, extension)
    }
}

/// Builds an export file name from the ISO-8601 time with `:` replaced by `-`.
pub fn export_file_name(panel: &str, at: DateTime<Utc>, extension: &str) -> String {
    format!("hmi-{panel}-log-{}.{extension}", at.format("%Y-%m-%dT%H-%M-%S"))
}

/// Renders an activity age as `Ns ago`, `Nm ago` or `Nh ago`.
pub fn format_activity_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

/// Renders an uptime as `HH:MM:SS`.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
