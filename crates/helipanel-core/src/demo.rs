//! Demo Mode - Simulated flight data generator
//!
//! Generates realistic telemetry for running the panel without a simulator.
//! The helicopter flies a slow left-to-right circle at cruise speed from a
//! fixed start point, with coordinated bank, occasional climbs and descents
//! and light turbulence.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use tokio::time::Instant;

use crate::telemetry::{EngineReadings, TelemetrySample, TelemetrySnapshot, TelemetrySource};

const START_LATITUDE_DEG: f64 = 54.524580;
const START_LONGITUDE_DEG: f64 = 39.701148;
const GROUND_ELEVATION_M: f64 = 150.0;
const START_ALTITUDE_M: f64 = 350.0;
const CRUISE_SPEED_KT: f64 = 90.0;
/// Full circle every two minutes
const TURN_RATE_DEG_S: f64 = 3.0;
const EARTH_RADIUS_M: f64 = 6_371_000.0;
const GRAVITY: f64 = 9.80665;
const KNOTS_TO_MPS: f64 = 0.514444;

/// Demo flight simulator that generates correlated flight and engine data
pub struct DemoSimulator {
    /// Time of the first update (ms)
    start_time_ms: Option<u64>,
    last_update_ms: Option<u64>,
    /// Time of next altitude change (ms from start)
    next_maneuver_at_ms: u64,
    maneuver: Maneuver,
    latitude_deg: f64,
    longitude_deg: f64,
    altitude_m: f64,
    heading_deg: f64,
    /// Smoothed values
    airspeed_kt: f64,
    climb_rate_mps: f64,
    fuel_percent: f64,
    rng: StdRng,
    /// Reference point for [`TelemetrySource::refresh`]
    clock_start: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Maneuver {
    /// Level flight
    Cruise,
    Climb { start_ms: u64 },
    Descend { start_ms: u64 },
}

impl Default for DemoSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoSimulator {
    /// Create a new demo simulator
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Reproducible simulator for tests and one-shot renders
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: StdRng) -> Self {
        let first_maneuver = rng.gen_range(20_000..40_000);
        Self {
            start_time_ms: None,
            last_update_ms: None,
            next_maneuver_at_ms: first_maneuver,
            maneuver: Maneuver::Cruise,
            latitude_deg: START_LATITUDE_DEG,
            longitude_deg: START_LONGITUDE_DEG,
            altitude_m: START_ALTITUDE_M,
            heading_deg: 0.0,
            airspeed_kt: CRUISE_SPEED_KT,
            climb_rate_mps: 0.0,
            fuel_percent: EngineReadings::default().fuel_percent,
            rng,
            clock_start: None,
        }
    }

    /// Advance the simulation and produce the current state
    ///
    /// # Arguments
    /// * `elapsed_ms` - Milliseconds since simulation started
    pub fn update(&mut self, elapsed_ms: u64) -> (TelemetrySample, EngineReadings) {
        let start = *self.start_time_ms.get_or_insert(elapsed_ms);
        let sim_time = elapsed_ms.saturating_sub(start);
        let delta_ms = self
            .last_update_ms
            .map_or(0, |last| elapsed_ms.saturating_sub(last));
        self.last_update_ms = Some(elapsed_ms);
        let dt = delta_ms as f64 / 1000.0;
        let t = sim_time as f64 / 1000.0;

        self.update_maneuver(sim_time);

        // Smooth climb rate toward the maneuver target (m/s per second)
        let target_climb = self.target_climb_rate(sim_time);
        let max_change = 1.5 * dt;
        self.climb_rate_mps += (target_climb - self.climb_rate_mps).clamp(-max_change, max_change);

        let gust = self.rng.gen_range(-1.0..1.0);
        let target_speed = CRUISE_SPEED_KT - 4.0 * self.climb_rate_mps + 3.0 * (t * 0.05).sin();
        self.airspeed_kt += (target_speed - self.airspeed_kt) * (dt * 0.5).min(1.0) + 0.3 * gust;
        self.airspeed_kt = self.airspeed_kt.max(0.0);

        // Integrate position along the current heading
        let ground_speed = self.airspeed_kt * KNOTS_TO_MPS;
        let distance = ground_speed * dt;
        let heading_rad = self.heading_deg.to_radians();
        self.latitude_deg += (distance * heading_rad.cos() / EARTH_RADIUS_M).to_degrees();
        self.longitude_deg += (distance * heading_rad.sin()
            / (EARTH_RADIUS_M * self.latitude_deg.to_radians().cos()))
        .to_degrees();
        self.heading_deg = (self.heading_deg + TURN_RATE_DEG_S * dt).rem_euclid(360.0);

        self.altitude_m = (self.altitude_m + self.climb_rate_mps * dt).max(GROUND_ELEVATION_M);

        // Coordinated turn: tan(bank) = v * omega / g
        let omega = TURN_RATE_DEG_S.to_radians();
        let bank = (ground_speed * omega / GRAVITY).atan();
        let roll_rad = bank + 0.5f64.to_radians() * gust;
        let pitch_deg = 2.0 * (t * 0.2).sin() + 1.5 * self.climb_rate_mps;
        let pitch_rad = pitch_deg.to_radians();

        let sample = TelemetrySample {
            latitude_deg: self.latitude_deg,
            longitude_deg: self.longitude_deg,
            altitude_m: self.altitude_m,
            height_above_ground_m: self.altitude_m - GROUND_ELEVATION_M,
            roll_rad,
            pitch_rad,
            yaw_rad: self.heading_deg.to_radians(),
            climb_rate_mps: self.climb_rate_mps,
            airspeed_kt: self.airspeed_kt,
        };

        // Fuel burns slowly, more in the climb
        let burn = 0.01 + 0.004 * self.climb_rate_mps.max(0.0);
        self.fuel_percent = (self.fuel_percent - burn * dt).max(0.0);

        let rpm = 2000.0 + 40.0 * self.climb_rate_mps + 15.0 * (t * 1.3).sin();
        let engine = EngineReadings {
            fuel_percent: self.fuel_percent,
            rpm,
            // standard lapse rate from the start altitude
            outside_air_temp_c: 19.0 - 0.0065 * (self.altitude_m - START_ALTITUDE_M),
            engine_temp_c: 690.0 + 8.0 * self.climb_rate_mps + 3.0 * (t * 0.4).sin(),
            oil_liters: 9.0,
        };

        (sample, engine)
    }

    /// Update the maneuver state machine
    fn update_maneuver(&mut self, sim_time: u64) {
        const MANEUVER_MS: u64 = 15_000;

        match self.maneuver {
            Maneuver::Cruise => {
                if sim_time >= self.next_maneuver_at_ms {
                    let height = self.altitude_m - GROUND_ELEVATION_M;
                    // stay well clear of the ground
                    let climb = height < 150.0 || self.rng.gen_bool(0.5);
                    self.maneuver = if climb {
                        Maneuver::Climb { start_ms: sim_time }
                    } else {
                        Maneuver::Descend { start_ms: sim_time }
                    };
                }
            }
            Maneuver::Climb { start_ms } | Maneuver::Descend { start_ms } => {
                if sim_time >= start_ms + MANEUVER_MS {
                    self.maneuver = Maneuver::Cruise;
                    let next_interval = self.rng.gen_range(20_000..40_000);
                    self.next_maneuver_at_ms = sim_time + next_interval;
                }
            }
        }
    }

    /// Target vertical speed for the current maneuver
    fn target_climb_rate(&self, sim_time: u64) -> f64 {
        match self.maneuver {
            Maneuver::Cruise => 0.3 * (sim_time as f64 / 7000.0).sin(),
            Maneuver::Climb { .. } => 3.0,
            Maneuver::Descend { .. } => -2.0,
        }
    }
}

impl TelemetrySource for DemoSimulator {
    async fn refresh(&mut self) -> TelemetrySnapshot {
        let start = *self.clock_start.get_or_insert_with(Instant::now);
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let (sample, engine) = self.update(elapsed_ms);
        TelemetrySnapshot {
            sample,
            engine,
            feed_stale: false,
            pull_connected: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_starts_at_reference_point() {
        let mut sim = DemoSimulator::with_seed(1);
        let (sample, engine) = sim.update(0);

        assert!((sample.latitude_deg - START_LATITUDE_DEG).abs() < 1e-9);
        assert!((sample.longitude_deg - START_LONGITUDE_DEG).abs() < 1e-9);
        assert_eq!(sample.altitude_m, START_ALTITUDE_M);
        assert!((engine.fuel_percent - 73.0).abs() < 1e-9);
    }

    #[test]
    fn test_cruise_stays_in_gauge_ranges() {
        let mut sim = DemoSimulator::with_seed(7);

        // Two simulated minutes at 30 Hz
        for ms in (0..120_000).step_by(33) {
            let (sample, _) = sim.update(ms);
            assert!(sample.airspeed_kt > 50.0 && sample.airspeed_kt < 150.0, "airspeed {}", sample.airspeed_kt);
            assert!(sample.climb_rate_mps.abs() <= 20.0);
            assert!(sample.height_above_ground_m >= 0.0);
            assert!(sample.roll_deg() > 0.0 && sample.roll_deg() < 30.0, "roll {}", sample.roll_deg());
        }
    }

    #[test]
    fn test_heading_turns_steadily() {
        let mut sim = DemoSimulator::with_seed(3);
        sim.update(1);
        let (sample, _) = sim.update(10_001);
        assert!((sample.heading_deg() - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_fuel_burns_over_time() {
        let mut sim = DemoSimulator::with_seed(5);
        let (_, first) = sim.update(1000);
        let mut last = first;
        for ms in (1100..61_000).step_by(100) {
            last = sim.update(ms).1;
        }
        assert!(last.fuel_percent < first.fuel_percent);
    }

    #[test]
    fn test_same_seed_same_flight() {
        let mut a = DemoSimulator::with_seed(42);
        let mut b = DemoSimulator::with_seed(42);
        for ms in (0..5000).step_by(100) {
            assert_eq!(a.update(ms), b.update(ms));
        }
    }
}
