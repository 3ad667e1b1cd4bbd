//! Flight path recorder
//!
//! Keeps a thinned copy of the flown path and writes it out as GeoJSON on
//! request. Recording is cheap enough to run every tick; export is not and
//! only happens when asked for.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::TrajectorySettings;
use crate::telemetry::TelemetrySample;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Errors while exporting a trajectory
#[derive(Error, Debug)]
pub enum TrajectoryError {
    /// Nothing to export
    #[error("No trajectory points recorded")]
    Empty,

    /// The output file could not be written
    #[error("Cannot write trajectory to {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Serialization failed
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// One recorded position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    /// Time since recording started
    pub elapsed: Duration,
    /// Latitude, degrees
    pub latitude_deg: f64,
    /// Longitude, degrees
    pub longitude_deg: f64,
    /// Altitude above sea level, m
    pub altitude_m: f64,
}

impl TrackPoint {
    fn coordinates(&self) -> Value {
        json!([self.longitude_deg, self.latitude_deg, self.altitude_m])
    }
}

/// Great-circle distance between two points in meters (haversine)
pub fn haversine_m(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let (lat1, lat2) = (lat1_deg.to_radians(), lat2_deg.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (lon2_deg - lon1_deg).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

/// Flight path recorder
pub struct TrajectoryRecorder {
    settings: TrajectorySettings,
    points: VecDeque<TrackPoint>,
    /// Wall-clock start of recording
    started_at: DateTime<Utc>,
}

impl TrajectoryRecorder {
    /// Empty recorder; the wall-clock start is taken now
    pub fn new(settings: TrajectorySettings) -> Self {
        Self {
            points: VecDeque::new(),
            settings,
            started_at: Utc::now(),
        }
    }

    /// Offer a sample taken `elapsed` after recording started.
    ///
    /// Returns whether the point was kept. Points arriving faster than the
    /// configured interval, or closer than the minimum spacing to the last
    /// kept point, are skipped. Non-finite positions are never kept.
    pub fn record(&mut self, sample: &TelemetrySample, elapsed: Duration) -> bool {
        if !(sample.latitude_deg.is_finite() && sample.longitude_deg.is_finite()) {
            return false;
        }

        if let Some(last) = self.points.back() {
            let min_interval = Duration::from_millis(self.settings.min_interval_ms);
            if elapsed.saturating_sub(last.elapsed) < min_interval {
                return false;
            }
            let moved = haversine_m(
                last.latitude_deg,
                last.longitude_deg,
                sample.latitude_deg,
                sample.longitude_deg,
            );
            if moved < self.settings.min_spacing_m {
                return false;
            }
        }

        if self.settings.max_points > 0 && self.points.len() >= self.settings.max_points {
            self.points.pop_front();
        }
        self.points.push_back(TrackPoint {
            elapsed,
            latitude_deg: sample.latitude_deg,
            longitude_deg: sample.longitude_deg,
            altitude_m: sample.altitude_m,
        });
        true
    }

    /// Number of recorded points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// No points recorded yet
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Recorded points, oldest first
    pub fn points(&self) -> impl Iterator<Item = &TrackPoint> {
        self.points.iter()
    }

    /// Total path length in meters
    pub fn distance_m(&self) -> f64 {
        self.points
            .iter()
            .zip(self.points.iter().skip(1))
            .map(|(a, b)| haversine_m(a.latitude_deg, a.longitude_deg, b.latitude_deg, b.longitude_deg))
            .sum()
    }

    /// Build the GeoJSON `FeatureCollection`: path, start and current position.
    pub fn to_geojson(&self) -> Result<Value, TrajectoryError> {
        let (first, last) = match (self.points.front(), self.points.back()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(TrajectoryError::Empty),
        };

        let path: Vec<Value> = self.points.iter().map(TrackPoint::coordinates).collect();
        let duration_s = last.elapsed.saturating_sub(first.elapsed).as_secs_f64();

        Ok(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": path },
                    "properties": {
                        "name": "path",
                        "started_at": self.started_at.to_rfc3339(),
                        "points": self.points.len(),
                        "distance_m": self.distance_m(),
                        "duration_s": duration_s,
                    }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": first.coordinates() },
                    "properties": { "name": "start" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": last.coordinates() },
                    "properties": { "name": "current" }
                }
            ]
        }))
    }

    /// Write the GeoJSON document to `path`.
    pub fn export_geojson(&self, path: &Path) -> Result<(), TrajectoryError> {
        let doc = self.to_geojson()?;
        let content = serde_json::to_string_pretty(&doc)?;
        fs::write(path, content).map_err(|source| TrajectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Exported {} trajectory points to {}", self.points.len(), path.display());
        Ok(())
    }
}
