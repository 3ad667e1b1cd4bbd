use helipanel_core::config::{ConfigError, PanelConfig};
use pretty_assertions::assert_eq;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("panel.json");

    let mut config = PanelConfig::default();
    config.tick_rate_hz = 20;
    config.telemetry.host = "sim.local".to_string();
    config.save(&path).unwrap();

    let loaded = PanelConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.tick_interval(), Duration::from_millis(50));
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("panel.json");
    fs::write(&path, r#"{ "telemetry": { "telnet_port": 6500 } }"#).unwrap();

    let config = PanelConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.telemetry.telnet_port, 6500);
    assert_eq!(config.telemetry.gui_port, 5505);
    assert_eq!(config.layout.gauges.len(), 12);
}

#[test]
fn test_explicit_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let result = PanelConfig::load_or_default(Some(&dir.path().join("missing.json")));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_malformed_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("panel.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(PanelConfig::load(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn test_rejects_zero_tick_rate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("panel.json");
    fs::write(&path, r#"{ "tick_rate_hz": 0 }"#).unwrap();
    assert!(matches!(PanelConfig::load(&path), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_rejects_broken_gauge() {
    let mut config = PanelConfig::default();
    config.layout.gauges[1].size.width = 0.0;
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::Gauge { ref id, .. } if id == "attitude"));
}

#[test]
fn test_rejects_duplicate_gauge_ids() {
    let mut config = PanelConfig::default();
    let copy = config.layout.gauges[0].clone();
    config.layout.gauges.push(copy);
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}
