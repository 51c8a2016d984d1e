//! Panel configuration.
//!
//! [`PanelConfig`] holds every runtime setting of one panel.  It is read from
//! an optional TOML file; any field the file leaves out takes its default.
//!
//! ```toml
//! panel = "numpad"
//! target = "rpi3pc"
//! repeat_interval_ms = 250
//! export_dir = "/var/log/hmi"
//! ```
//!
//! # Serde default values (for beginners)
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is missing from the TOML file, so a config
//! file only has to mention what it changes.  An empty file is valid.
//!
//! # Where does the endpoint come from?
//!
//! The deployment scripts export ports and host names as environment
//! variables.  The binary collects them into a [`ConfigProvider`] (a flat
//! string map) and [`PanelConfig::resolve_endpoint`] builds the WebSocket URL
//! from it.  The domain never reads the environment itself.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use hmi_core::diagnostics::DEFAULT_LOG_CAPACITY;
use hmi_core::{KeyboardLayout, LegendBlock, WireSchema};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has a field of the wrong type.
    #[error("failed to parse config TOML at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A field has a value the panel cannot run with.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ── Panel kind ────────────────────────────────────────────────────────────────

/// Which virtual panel this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    #[default]
    Keyboard,
    Numpad,
    Touchpad,
}

impl PanelKind {
    pub fn name(self) -> &'static str {
        match self {
            PanelKind::Keyboard => "keyboard",
            PanelKind::Numpad => "numpad",
            PanelKind::Touchpad => "touchpad",
        }
    }

    /// Parses a panel name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "keyboard" => Some(PanelKind::Keyboard),
            "numpad" => Some(PanelKind::Numpad),
            "touchpad" => Some(PanelKind::Touchpad),
            _ => None,
        }
    }

    /// Shape of the outgoing wire messages for this panel.
    pub fn schema(self) -> WireSchema {
        match self {
            PanelKind::Keyboard => WireSchema::Keyboard,
            PanelKind::Numpad => WireSchema::Numpad,
            PanelKind::Touchpad => WireSchema::Touchpad,
        }
    }

    /// How single-character legends on this panel's keys are read.
    pub fn legend_block(self) -> LegendBlock {
        match self {
            PanelKind::Numpad => LegendBlock::Numpad,
            _ => LegendBlock::MainBlock,
        }
    }

    /// Device identifier used when the config does not set one.
    pub fn default_device_id(self) -> &'static str {
        match self {
            PanelKind::Keyboard => "hmi-keyboard",
            PanelKind::Numpad => "hmi-numpad",
            PanelKind::Touchpad => "hmi-pad",
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PanelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PanelKind::from_name(s).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "unknown panel '{s}' (expected keyboard, numpad or touchpad)"
            ))
        })
    }
}

// ── Config provider ───────────────────────────────────────────────────────────

/// Flat string map of deployment values (ports, host names).
///
/// Empty values are treated as missing, so `HOST_DOMAIN=` falls back to the
/// default the same way an unset variable does.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvider {
    values: HashMap<String, String>,
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a provider from `(key, value)` pairs, e.g. `std::env::vars()`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Returns the value for `key`, or `None` when it is unset or empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// WebSocket URL of the backend for `panel`.
    pub fn endpoint_for(&self, panel: PanelKind) -> String {
        let host = self.get_or("HOST_DOMAIN", "localhost");
        match panel {
            PanelKind::Keyboard => format!(
                "ws://{host}:{}/ws/keyboard",
                self.get_or("RPI_API_PORT", "4000")
            ),
            PanelKind::Touchpad => format!(
                "ws://{host}:{}/ws/touch",
                self.get_or("RPI_API_PORT", "4000")
            ),
            PanelKind::Numpad => {
                format!("ws://{host}:{}", self.get_or("HMI_NUMPAD_WS_PORT", "5560"))
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigProvider {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ── Panel config ──────────────────────────────────────────────────────────────

/// All runtime settings of one panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub panel: PanelKind,

    /// Panel identity sent with every event.  Defaults per panel kind.
    #[serde(default)]
    pub device_id: Option<String>,

    /// Remote device the events are addressed to.
    #[serde(default = "default_target")]
    pub target: String,

    /// Explicit WebSocket URL.  When unset the URL is built from the
    /// [`ConfigProvider`].
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Delay before reconnecting after a close or failed attempt.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Delay before the connect triggered by a manual reconnect.
    #[serde(default = "default_manual_reconnect_delay_ms")]
    pub manual_reconnect_delay_ms: u64,

    /// How long one connect attempt may take before it counts as failed.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_true")]
    pub key_repeat_enabled: bool,

    #[serde(default = "default_repeat_interval_ms")]
    pub repeat_interval_ms: u64,

    #[serde(default)]
    pub layout: KeyboardLayout,

    /// Diagnostics log size; values below 500 are raised to 500.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    #[serde(default = "default_true")]
    pub multi_touch: bool,

    #[serde(default = "default_true")]
    pub pressure_sensitive: bool,

    /// Multiplier applied to touch coordinates.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,

    /// Touch surface size in pixels.  Simulated gestures are centred on it.
    #[serde(default = "default_surface_width")]
    pub surface_width: f64,

    #[serde(default = "default_surface_height")]
    pub surface_height: f64,

    /// Directory the diagnostics snapshot is written to on shutdown and on
    /// `export`.  Nothing is written when unset.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

fn default_target() -> String {
    "rpi3pc".to_string()
}
fn default_reconnect_delay_ms() -> u64 {
    3000
}
fn default_manual_reconnect_delay_ms() -> u64 {
    1000
}
fn default_connect_timeout_ms() -> u64 {
    5000
}
fn default_true() -> bool {
    true
}
fn default_repeat_interval_ms() -> u64 {
    500
}
fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}
fn default_sensitivity() -> f64 {
    1.0
}
fn default_surface_width() -> f64 {
    800.0
}
fn default_surface_height() -> f64 {
    600.0
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            panel: PanelKind::default(),
            device_id: None,
            target: default_target(),
            endpoint: None,
            reconnect_delay_ms: default_reconnect_delay_ms(),
            manual_reconnect_delay_ms: default_manual_reconnect_delay_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            key_repeat_enabled: true,
            repeat_interval_ms: default_repeat_interval_ms(),
            layout: KeyboardLayout::default(),
            log_capacity: default_log_capacity(),
            multi_touch: true,
            pressure_sensitive: true,
            sensitivity: default_sensitivity(),
            surface_width: default_surface_width(),
            surface_height: default_surface_height(),
            export_dir: None,
        }
    }
}

impl PanelConfig {
    /// Default configuration for `panel`.
    pub fn for_panel(panel: PanelKind) -> Self {
        Self {
            panel,
            ..Self::default()
        }
    }

    /// Reads and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read,
    /// [`ConfigError::Parse`] for malformed TOML, and
    /// [`ConfigError::Invalid`] when [`Self::validate`] rejects a value.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: PanelConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: PanelConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("reconnect_delay_ms", self.reconnect_delay_ms),
            ("manual_reconnect_delay_ms", self.manual_reconnect_delay_ms),
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("repeat_interval_ms", self.repeat_interval_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be greater than 0")));
            }
        }
        if !(self.sensitivity.is_finite() && self.sensitivity > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sensitivity must be a positive number, got {}",
                self.sensitivity
            )));
        }
        let surface = [
            ("surface_width", self.surface_width),
            ("surface_height", self.surface_height),
        ];
        for (name, value) in surface {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.target.trim().is_empty() {
            return Err(ConfigError::Invalid("target must not be empty".to_string()));
        }
        Ok(())
    }

    /// Device identifier: the configured one, or the panel's default.
    pub fn device_id(&self) -> &str {
        self.device_id
            .as_deref()
            .unwrap_or_else(|| self.panel.default_device_id())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn manual_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.manual_reconnect_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn repeat_interval(&self) -> Duration {
        Duration::from_millis(self.repeat_interval_ms)
    }

    /// Centre of the touch surface, where simulated gestures happen.
    pub fn surface_center(&self) -> (f64, f64) {
        (self.surface_width / 2.0, self.surface_height / 2.0)
    }

    /// WebSocket URL to connect to.  An explicit `endpoint` wins over the
    /// provider.
    pub fn resolve_endpoint(&self, provider: &ConfigProvider) -> String {
        match &self.endpoint {
            Some(endpoint) if !endpoint.trim().is_empty() => endpoint.clone(),
            _ => provider.endpoint_for(self.panel),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        // Arrange / Act
        let cfg = PanelConfig::from_toml_str("").expect("empty config is valid");

        // Assert
        assert_eq!(cfg, PanelConfig::default());
        assert_eq!(cfg.reconnect_delay(), Duration::from_millis(3000));
        assert_eq!(cfg.repeat_interval(), Duration::from_millis(500));
        assert_eq!(cfg.target, "rpi3pc");
        assert_eq!(cfg.log_capacity, 1000);
    }

    #[test]
    fn test_partial_toml_overrides_only_given_fields() {
        // Arrange
        let text = r#"
            panel = "numpad"
            repeat_interval_ms = 250
            layout = "azerty"
        "#;

        // Act
        let cfg = PanelConfig::from_toml_str(text).expect("valid config");

        // Assert
        assert_eq!(cfg.panel, PanelKind::Numpad);
        assert_eq!(cfg.repeat_interval_ms, 250);
        assert_eq!(cfg.layout, KeyboardLayout::Azerty);
        assert_eq!(cfg.reconnect_delay_ms, 3000);
        assert!(cfg.key_repeat_enabled);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = PanelConfig::from_toml_str("reconnect_delay_ms = 0");

        assert!(matches!(result, Err(ConfigError::Invalid(msg)) if msg.contains("reconnect_delay_ms")));
    }

    #[test]
    fn test_surface_size_sets_gesture_center() {
        // Arrange / Act
        let cfg = PanelConfig::from_toml_str("surface_width = 1024.0\nsurface_height = 400.0")
            .expect("valid config");

        // Assert
        assert_eq!(cfg.surface_center(), (512.0, 200.0));
        assert_eq!(PanelConfig::default().surface_center(), (400.0, 300.0));
        assert!(PanelConfig::from_toml_str("surface_height = 0.0").is_err());
    }

    #[test]
    fn test_non_positive_sensitivity_is_rejected() {
        assert!(PanelConfig::from_toml_str("sensitivity = 0.0").is_err());
        assert!(PanelConfig::from_toml_str("sensitivity = -1.5").is_err());
        assert!(PanelConfig::from_toml_str("sensitivity = 2.5").is_ok());
    }

    #[test]
    fn test_unknown_panel_is_a_parse_error() {
        let result = PanelConfig::from_toml_str(r#"panel = "monitor""#);

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_device_id_defaults_per_panel() {
        assert_eq!(PanelConfig::for_panel(PanelKind::Keyboard).device_id(), "hmi-keyboard");
        assert_eq!(PanelConfig::for_panel(PanelKind::Numpad).device_id(), "hmi-numpad");
        assert_eq!(PanelConfig::for_panel(PanelKind::Touchpad).device_id(), "hmi-pad");

        let cfg = PanelConfig {
            device_id: Some("line-3".to_string()),
            ..PanelConfig::default()
        };
        assert_eq!(cfg.device_id(), "line-3");
    }

    #[test]
    fn test_endpoint_defaults_without_provider_values() {
        // Arrange
        let provider = ConfigProvider::new();

        // Act / Assert
        assert_eq!(
            provider.endpoint_for(PanelKind::Keyboard),
            "ws://localhost:4000/ws/keyboard"
        );
        assert_eq!(
            provider.endpoint_for(PanelKind::Touchpad),
            "ws://localhost:4000/ws/touch"
        );
        assert_eq!(provider.endpoint_for(PanelKind::Numpad), "ws://localhost:5560");
    }

    #[test]
    fn test_endpoint_uses_provider_values() {
        // Arrange
        let provider = ConfigProvider::from_pairs([
            ("HOST_DOMAIN", "hmi.local"),
            ("RPI_API_PORT", "8080"),
            ("HMI_NUMPAD_WS_PORT", "6000"),
        ]);

        // Act / Assert
        assert_eq!(
            provider.endpoint_for(PanelKind::Keyboard),
            "ws://hmi.local:8080/ws/keyboard"
        );
        assert_eq!(provider.endpoint_for(PanelKind::Numpad), "ws://hmi.local:6000");
    }

    #[test]
    fn test_empty_provider_value_counts_as_missing() {
        let provider = ConfigProvider::from_pairs([("HOST_DOMAIN", ""), ("RPI_API_PORT", " ")]);

        assert_eq!(provider.get("HOST_DOMAIN"), None);
        assert_eq!(
            provider.endpoint_for(PanelKind::Touchpad),
            "ws://localhost:4000/ws/touch"
        );
    }

    #[test]
    fn test_explicit_endpoint_wins_over_provider() {
        let provider = ConfigProvider::from_pairs([("HOST_DOMAIN", "hmi.local")]);
        let cfg = PanelConfig {
            endpoint: Some("ws://10.0.0.5:9000/ws".to_string()),
            ..PanelConfig::default()
        };

        assert_eq!(cfg.resolve_endpoint(&provider), "ws://10.0.0.5:9000/ws");
    }

    #[test]
    fn test_panel_kind_parsing_and_schema() {
        assert_eq!("Numpad".parse::<PanelKind>().expect("valid"), PanelKind::Numpad);
        assert!("lcd".parse::<PanelKind>().is_err());
        assert_eq!(PanelKind::Touchpad.schema(), WireSchema::Touchpad);
        assert_eq!(PanelKind::Numpad.legend_block(), LegendBlock::Numpad);
        assert_eq!(PanelKind::Keyboard.legend_block(), LegendBlock::MainBlock);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = PanelConfig::load(Path::new("/nonexistent/hmi-panel.toml"));

        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
