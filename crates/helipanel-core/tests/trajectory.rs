use helipanel_core::config::TrajectorySettings;
use helipanel_core::demo::DemoSimulator;
use helipanel_core::trajectory::{TrajectoryError, TrajectoryRecorder};
use serde_json::Value;
use std::time::Duration;
use tempfile::tempdir;

fn record_demo_flight(seconds: u64) -> TrajectoryRecorder {
    let mut sim = DemoSimulator::with_seed(7);
    let mut recorder = TrajectoryRecorder::new(TrajectorySettings::default());
    for ms in (0..=seconds * 1000).step_by(100) {
        let (sample, _) = sim.update(ms);
        recorder.record(&sample, Duration::from_millis(ms));
    }
    recorder
}

#[test]
fn test_demo_flight_is_thinned() {
    let recorder = record_demo_flight(60);
    // one point per second at most
    assert!(recorder.len() <= 61);
    assert!(recorder.len() > 30);
    // 90 kt for a minute is roughly 2.8 km
    let d = recorder.distance_m();
    assert!(d > 1_500.0 && d < 4_000.0, "distance {d}");
}

#[test]
fn test_export_geojson_file() {
    let recorder = record_demo_flight(20);
    let dir = tempdir().unwrap();
    let path = dir.path().join("track.geojson");
    recorder.export_geojson(&path).unwrap();

    let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["type"], "FeatureCollection");
    let features = doc["features"].as_array().unwrap();
    assert_eq!(features.len(), 3);

    let line = &features[0];
    assert_eq!(line["geometry"]["type"], "LineString");
    let coords = line["geometry"]["coordinates"].as_array().unwrap();
    assert_eq!(coords.len(), recorder.len());
    assert_eq!(line["properties"]["points"], recorder.len());

    // GeoJSON order is longitude, latitude, altitude
    let start = &features[1]["geometry"]["coordinates"];
    let first = recorder.points().next().unwrap();
    assert_eq!(start[0].as_f64().unwrap(), first.longitude_deg);
    assert_eq!(start[1].as_f64().unwrap(), first.latitude_deg);
    assert_eq!(features[2]["properties"]["name"], "current");
}

#[test]
fn test_export_to_missing_directory_fails() {
    let recorder = record_demo_flight(5);
    let dir = tempdir().unwrap();
    let result = recorder.export_geojson(&dir.path().join("no").join("track.geojson"));
    assert!(matches!(result, Err(TrajectoryError::Io { .. })));
}
