//! Panel configuration stored as JSON
//!
//! Every section has defaults, so a partial file (or none at all) yields a
//! working panel. The default location is `<config dir>/helipanel/panel.json`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::gauge::RenderError;
use crate::panel::PanelLayout;
use crate::telemetry::{EngineReadings, EngineReadout};

const CONFIG_DIR_NAME: &str = "helipanel";
const CONFIG_FILE_NAME: &str = "panel.json";

/// Errors while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("Cannot access config file {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The file is not valid panel JSON
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The platform has no user config directory
    #[error("Could not determine the user config directory")]
    NoConfigDir,

    /// A setting is out of range
    #[error("Invalid setting: {0}")]
    Invalid(String),

    /// A gauge in the layout failed validation
    #[error("Gauge '{id}' is invalid: {source}")]
    Gauge {
        /// Id of the offending gauge
        id: String,
        /// What is wrong with it
        #[source]
        source: RenderError,
    },
}

/// Maps one simulator property onto an engine readout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineBinding {
    /// Readout the value feeds
    pub readout: EngineReadout,
    /// Property path, e.g. `/engines/engine/rpm`
    pub property: String,
    /// Multiplier applied to the raw value
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Added after scaling
    #[serde(default)]
    pub offset: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl EngineBinding {
    /// Apply scale and offset to a raw property value
    pub fn apply(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }
}

/// Simulator connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Simulator host for the telnet session
    pub host: String,
    /// Local address the GUI feed socket binds to
    pub gui_bind_address: String,
    /// UDP port of the GUI feed
    pub gui_port: u16,
    /// TCP port of the telnet property server
    pub telnet_port: u16,
    /// Property polled for indicated airspeed
    pub airspeed_property: String,
    /// Telnet connect timeout
    pub connect_timeout_ms: u64,
    /// Upper bound for all telnet queries of one tick
    pub request_timeout_ms: u64,
    /// GUI feed silence after which link loss is flagged
    pub stale_after_ms: u64,
    /// Minimum gap between telnet reconnect attempts
    pub reconnect_interval_ms: u64,
    /// Properties polled for engine readouts
    pub engine_bindings: Vec<EngineBinding>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            gui_bind_address: "0.0.0.0".to_string(),
            gui_port: 5505,
            telnet_port: 5500,
            airspeed_property: "/velocities/airspeed-kt".to_string(),
            connect_timeout_ms: 1000,
            request_timeout_ms: 25,
            stale_after_ms: 1000,
            reconnect_interval_ms: 2000,
            engine_bindings: Vec::new(),
        }
    }
}

impl TelemetrySettings {
    /// Telnet connect timeout as a duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Per-tick telnet budget as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Feed staleness window as a duration
    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }

    /// Reconnect gap as a duration
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

/// Frame snapshot output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Where the SVG snapshot is written
    pub snapshot_path: PathBuf,
    /// Write a snapshot every N rendered frames
    pub snapshot_every_ticks: u32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("helipanel.svg"),
            snapshot_every_ticks: 30,
        }
    }
}

/// Flight path recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectorySettings {
    /// Minimum time between recorded points
    pub min_interval_ms: u64,
    /// Points closer than this to the previous one are skipped
    pub min_spacing_m: f64,
    /// Oldest points are dropped beyond this count
    pub max_points: usize,
}

impl Default for TrajectorySettings {
    fn default() -> Self {
        Self {
            min_interval_ms: 1000,
            min_spacing_m: 5.0,
            max_points: 100_000,
        }
    }
}

/// Top-level panel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Simulator connection
    pub telemetry: TelemetrySettings,
    /// Engine values used where no property binding exists
    pub engine_defaults: EngineReadings,
    /// Refresh and render rate
    pub tick_rate_hz: u32,
    /// Gauge placement and colors
    pub layout: PanelLayout,
    /// Snapshot output
    pub output: OutputSettings,
    /// Flight path recording
    pub trajectory: TrajectorySettings,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            telemetry: TelemetrySettings::default(),
            engine_defaults: EngineReadings::default(),
            tick_rate_hz: 30,
            layout: PanelLayout::default(),
            output: OutputSettings::default(),
            trajectory: TrajectorySettings::default(),
        }
    }
}

impl PanelConfig {
    /// `<config dir>/helipanel/panel.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PanelConfig = serde_json::from_str(&content)?;
        config.validate()?;
        info!("Loaded panel config from {}", path.display());
        Ok(config)
    }

    /// Load `explicit` if given. Otherwise load the default file when it
    /// exists, and fall back to built-in defaults when it does not.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Ok(path) if path.exists() => Self::load(&path),
            _ => {
                info!("No panel config found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)?;
        Ok(())
    }

    /// Check ranges and every gauge in the layout
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_hz == 0 || self.tick_rate_hz > 1000 {
            return Err(ConfigError::Invalid(format!(
                "tick_rate_hz must be between 1 and 1000, got {}",
                self.tick_rate_hz
            )));
        }
        if self.output.snapshot_every_ticks == 0 {
            return Err(ConfigError::Invalid(
                "output.snapshot_every_ticks must be at least 1".to_string(),
            ));
        }
        if self.telemetry.request_timeout_ms == 0 || self.telemetry.stale_after_ms == 0 {
            return Err(ConfigError::Invalid(
                "telemetry timeouts must be non-zero".to_string(),
            ));
        }
        for binding in &self.telemetry.engine_bindings {
            if !(binding.scale.is_finite() && binding.offset.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "binding for '{}' has a non-finite scale or offset",
                    binding.property
                )));
            }
        }
        if !(self.layout.width > 0.0 && self.layout.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "panel size must be positive, got {}x{}",
                self.layout.width, self.layout.height
            )));
        }

        let mut ids = HashSet::new();
        for gauge in &self.layout.gauges {
            if !ids.insert(gauge.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate gauge id '{}'", gauge.id)));
            }
            gauge.validate().map_err(|source| ConfigError::Gauge {
                id: gauge.id.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Period of the render loop
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PanelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.telemetry.gui_port, 5505);
        assert_eq!(config.telemetry.telnet_port, 5500);
        assert_eq!(config.tick_interval(), Duration::from_secs_f64(1.0 / 30.0));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: PanelConfig =
            serde_json::from_str(r#"{"tick_rate_hz": 10, "telemetry": {"host": "sim.local"}}"#).unwrap();
        assert_eq!(config.tick_rate_hz, 10);
        assert_eq!(config.telemetry.host, "sim.local");
        assert_eq!(config.telemetry.request_timeout_ms, 25);
        assert_eq!(config.layout, PanelLayout::default());
    }

    #[test]
    fn test_binding_scale_defaults_to_one() {
        let binding: EngineBinding =
            serde_json::from_str(r#"{"readout": "rpm", "property": "/engines/engine/rpm"}"#).unwrap();
        assert_eq!(binding.apply(1500.0), 1500.0);
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let config = PanelConfig {
            tick_rate_hz: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
