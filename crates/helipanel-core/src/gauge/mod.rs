//! Gauge rendering model.
//!
//! Every gauge is a pure function of (bound value, [`GaugeSpec`]) producing
//! draw commands. Nothing here keeps state between frames.

/// Attitude sphere
pub mod attitude;
/// Heading compass
pub mod compass;
/// Text-box readouts
pub mod readout;
/// Circular scales
pub mod scale;
/// Fault status strip
pub mod status;

pub use attitude::{render_attitude_sphere, AttitudeGeometry, AttitudeSpec};
pub use compass::{render_heading_compass, CompassSpec, CompassTick};
pub use readout::{render_text_box, TextBoxSpec};
pub use scale::{render_circular_scale, NeedleGeometry, ScaleSpec, ScaleTick};
pub use status::{render_status_strip, StatusSlot, StatusStripSpec};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::{Color, Point, Size};

/// Value source a gauge is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Indicated airspeed, knots
    Airspeed,
    /// Vertical speed, m/s
    ClimbRate,
    /// Altitude above sea level, m
    Altitude,
    /// Height above ground, m
    HeightAboveGround,
    /// True heading, degrees
    Heading,
    /// Fuel remaining, percent
    FuelPercent,
    /// Engine speed, rpm
    EngineRpm,
    /// Outside air temperature, °C
    OutsideAirTemp,
    /// Engine temperature, °C
    EngineTemp,
    /// Oil quantity, liters
    OilQuantity,
    /// Wall-clock time of the frame
    Clock,
}

/// Errors that stop a single gauge from rendering.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Range is empty or reversed
    #[error("invalid range: min {min} must be below max {max}")]
    InvalidRange {
        /// Configured lower bound
        min: f64,
        /// Configured upper bound
        max: f64,
    },

    /// Tick interval is zero, negative or not finite
    #[error("tick interval must be positive and finite, got {0}")]
    InvalidTick(f64),

    /// Sweep is zero or wider than a full turn
    #[error("sweep angle must be non-zero and at most 360 degrees, got {0}")]
    InvalidSweep(f64),

    /// Gauge box has no area
    #[error("gauge size must be positive, got {width}x{height}")]
    InvalidSize {
        /// Configured width
        width: f64,
        /// Configured height
        height: f64,
    },

    /// A numeric gauge is bound to the clock
    #[error("channel {0:?} has no numeric value")]
    NonNumericChannel(Channel),
}

/// How a numeric value is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    /// Truncated toward zero, like the classic instruments
    #[default]
    Integer,
    /// One decimal place
    OneDecimal,
    /// Explicit sign, one decimal (vertical speed)
    SignedOneDecimal,
}

impl ValueFormat {
    /// Print `value`, or `---` when it is not finite
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return "---".to_string();
        }
        match self {
            Self::Integer => format!("{}", value.trunc() as i64),
            Self::OneDecimal => format!("{:.1}", value),
            Self::SignedOneDecimal => format!("{:+.1}", value),
        }
    }
}

/// A static caption drawn on a gauge face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelLine {
    /// Caption text
    pub text: String,
    /// Offset of the text center from the gauge center
    pub offset: Point,
    /// Font size in pixels
    pub font_size: f64,
    /// Falls back to the palette label color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl LabelLine {
    /// Caption centered at `(dx, dy)` from the gauge center
    pub fn new(text: &str, dx: f64, dy: f64, font_size: f64) -> Self {
        Self {
            text: text.to_string(),
            offset: Point::new(dx, dy),
            font_size,
            color: None,
        }
    }

    /// Override the palette color
    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Kind-specific gauge parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GaugeKind {
    /// Dial with a needle
    CircularScale(ScaleSpec),
    /// Artificial horizon
    AttitudeSphere(AttitudeSpec),
    /// Rotating compass card
    HeadingCompass(CompassSpec),
    /// Row of fault lights
    StatusStrip(StatusStripSpec),
    /// Caption and value box
    TextBox(TextBoxSpec),
}

impl GaugeKind {
    /// Kind name as it appears in the config file
    pub fn name(&self) -> &'static str {
        match self {
            Self::CircularScale(_) => "circular_scale",
            Self::AttitudeSphere(_) => "attitude_sphere",
            Self::HeadingCompass(_) => "heading_compass",
            Self::StatusStrip(_) => "status_strip",
            Self::TextBox(_) => "text_box",
        }
    }
}

/// One instrument on the panel: where it sits and how it is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeSpec {
    /// Unique id within the layout
    pub id: String,
    /// Top-left corner in panel pixels
    pub position: Point,
    /// Box size in panel pixels
    pub size: Size,
    /// What the gauge draws
    #[serde(flatten)]
    pub kind: GaugeKind,
}

impl GaugeSpec {
    /// Build a spec from its parts
    pub fn new(id: &str, position: Point, size: Size, kind: GaugeKind) -> Self {
        Self {
            id: id.to_string(),
            position,
            size,
            kind,
        }
    }

    /// Center of the gauge box
    pub fn center(&self) -> Point {
        self.position
            .offset(self.size.width / 2.0, self.size.height / 2.0)
    }

    /// Radius of the largest circle fitting the gauge box
    pub fn radius(&self) -> f64 {
        self.size.width.min(self.size.height) / 2.0
    }

    /// Check the static parameters once, before the first frame.
    pub fn validate(&self) -> Result<(), RenderError> {
        check_size(self.size)?;
        match &self.kind {
            GaugeKind::CircularScale(spec) => spec.validate(),
            GaugeKind::StatusStrip(spec) => spec.validate(),
            _ => Ok(()),
        }
    }
}

pub(crate) fn check_size(size: Size) -> Result<(), RenderError> {
    if size.is_positive() && size.width.is_finite() && size.height.is_finite() {
        Ok(())
    } else {
        Err(RenderError::InvalidSize {
            width: size.width,
            height: size.height,
        })
    }
}

/// Triangle pointer: tip along `angle_deg`, two wings at ±150° from it.
pub fn needle_polygon(center: Point, angle_deg: f64, tip_length: f64, wing_length: f64) -> [Point; 3] {
    [
        Point::polar(center, tip_length, angle_deg),
        Point::polar(center, wing_length, angle_deg + 150.0),
        Point::polar(center, wing_length, angle_deg - 150.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_format() {
        assert_eq!(ValueFormat::Integer.format(150.9), "150");
        assert_eq!(ValueFormat::Integer.format(-2.7), "-2");
        assert_eq!(ValueFormat::SignedOneDecimal.format(1.0), "+1.0");
        assert_eq!(ValueFormat::SignedOneDecimal.format(-3.26), "-3.3");
        assert_eq!(ValueFormat::OneDecimal.format(f64::NAN), "---");
    }

    #[test]
    fn test_needle_polygon_wings_are_symmetric() {
        let c = Point::new(0.0, 0.0);
        let [tip, left, right] = needle_polygon(c, -90.0, 75.0, 10.0);
        assert!((tip.y + 75.0).abs() < 1e-9);
        assert!(tip.x.abs() < 1e-9);
        assert!((left.x + right.x).abs() < 1e-9);
        assert!((left.y - right.y).abs() < 1e-9);
        // wings sit behind the center, opposite the tip
        assert!(left.y > 0.0);
    }

    #[test]
    fn test_gauge_spec_center_and_radius() {
        let spec = GaugeSpec::new(
            "speed",
            Point::new(150.0, 155.0),
            Size::square(200.0),
            GaugeKind::CircularScale(ScaleSpec::airspeed()),
        );
        assert_eq!(spec.center(), Point::new(250.0, 255.0));
        assert_eq!(spec.radius(), 100.0);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_invalid_size_rejected() {
        let spec = GaugeSpec::new(
            "broken",
            Point::default(),
            Size::new(0.0, 10.0),
            GaugeKind::HeadingCompass(CompassSpec::default()),
        );
        assert!(matches!(spec.validate(), Err(RenderError::InvalidSize { .. })));
    }
}
