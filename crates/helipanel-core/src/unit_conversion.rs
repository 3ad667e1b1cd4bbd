//! Unit Conversion Functions
//!
//! Conversions between the units FlightGear reports and the units the panel
//! displays:
//! - Vertical speed: ft/s → m/s
//! - Compass angles: normalization into one turn

/// Meters per foot (exact, international foot)
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Convert feet per second to meters per second
pub fn feet_per_sec_to_meters_per_sec(fps: f64) -> f64 {
    fps * METERS_PER_FOOT
}

/// Normalize a compass angle into `[0, 360)`.
///
/// Non-finite input is returned unchanged so callers can detect it.
pub fn normalize_degrees(deg: f64) -> f64 {
    if !deg.is_finite() {
        return deg;
    }
    let normalized = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_climb_rate_conversion() {
        assert!((feet_per_sec_to_meters_per_sec(1.0) - 0.3048).abs() < 1e-12);
        assert!((feet_per_sec_to_meters_per_sec(-10.0) + 3.048).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(450.0), 90.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert!(normalize_degrees(-1e-20) < 360.0);
        assert!(normalize_degrees(f64::NAN).is_nan());
    }
}
