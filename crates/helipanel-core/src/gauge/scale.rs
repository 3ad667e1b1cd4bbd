//! Circular scale primitive.
//!
//! Maps a scalar linearly onto an arc:
//!
//! ```text
//! angle(v) = start_angle + (clamp(v) - min) / (max - min) * sweep
//! ```
//!
//! Angles are screen degrees (0° right, clockwise positive). A negative
//! `sweep` runs the scale counter-clockwise. Values outside `[min, max]`
//! pin the needle to the nearest bound and switch it to the over-range
//! color; the numeric readout still shows the real value.

use serde::{Deserialize, Serialize};

use super::{needle_polygon, Channel, LabelLine, RenderError, ValueFormat};
use crate::render::{Color, DrawCommand, Palette, Point};

const MAJOR_TICK_LENGTH: f64 = 15.0;
const MINOR_TICK_LENGTH: f64 = 8.0;
const TICK_WIDTH: f64 = 2.0;
const TICK_FONT_SIZE: f64 = 24.0;
const READOUT_FONT_SIZE: f64 = 24.0;
const NEEDLE_WING_LENGTH: f64 = 10.0;
const MAX_TICKS: f64 = 1000.0;
const EPSILON: f64 = 1e-9;

/// Parameters of one circular scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleSpec {
    /// Value the needle follows
    pub channel: Channel,
    /// Value at the start of the arc
    pub min: f64,
    /// Value at the end of the arc
    pub max: f64,
    /// Long, labeled tick spacing (in value units)
    pub major_tick: f64,
    /// Short tick spacing (in value units)
    pub minor_tick: f64,
    /// Screen angle of `min`
    pub start_angle: f64,
    /// Signed angular span from `min` to `max`
    pub sweep: f64,
    /// Tick labels show `value / label_divisor`
    pub label_divisor: f64,
    /// Tick labels show magnitudes only
    pub label_abs: bool,
    /// Extra long unlabeled ticks every N degrees of arc
    pub cardinal_step: Option<f64>,
    /// Static captions on the face
    pub labels: Vec<LabelLine>,
    /// Offset of the numeric readout from the gauge center
    pub readout_offset: Point,
    /// How the numeric readout is printed
    pub readout_format: ValueFormat,
    /// Width of the outer ring
    pub bezel_width: f64,
    /// Distance of tick labels from the rim
    pub label_inset: f64,
    /// Gap between the needle tip and the rim
    pub needle_margin: f64,
}

impl Default for ScaleSpec {
    fn default() -> Self {
        Self {
            channel: Channel::Airspeed,
            min: 0.0,
            max: 100.0,
            major_tick: 10.0,
            minor_tick: 5.0,
            start_angle: 135.0,
            sweep: 270.0,
            label_divisor: 1.0,
            label_abs: false,
            cardinal_step: None,
            labels: Vec::new(),
            readout_offset: Point::new(0.0, 30.0),
            readout_format: ValueFormat::Integer,
            bezel_width: 5.0,
            label_inset: 35.0,
            needle_margin: 25.0,
        }
    }
}

/// One tick mark on a scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleTick {
    /// Scale value at the tick
    pub value: f64,
    /// Screen angle in degrees
    pub angle: f64,
    /// Long labeled tick
    pub major: bool,
    /// Printed label, major ticks only
    pub label: Option<String>,
}

/// Where the needle points for a given value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeedleGeometry {
    /// Screen angle in degrees
    pub angle: f64,
    /// The value was outside the range (or not finite) and got clamped
    pub over_range: bool,
    /// Tip, then the two wing vertices
    pub points: [Point; 3],
}

impl ScaleSpec {
    /// Airspeed indicator: 0-300 kt over three quarters of a turn,
    /// counter-clockwise from twelve o'clock.
    pub fn airspeed() -> Self {
        Self {
            channel: Channel::Airspeed,
            min: 0.0,
            max: 300.0,
            major_tick: 100.0,
            minor_tick: 20.0,
            start_angle: -90.0,
            sweep: -270.0,
            labels: vec![LabelLine::new("KNOTS", 45.0, -62.0, 20.0)],
            readout_offset: Point::new(48.0, -35.0),
            readout_format: ValueFormat::Integer,
            label_inset: 35.0,
            ..Self::default()
        }
    }

    /// Altimeter: 0-2000 m in one full turn, labels in hundreds of meters.
    pub fn altimeter() -> Self {
        Self {
            channel: Channel::Altitude,
            min: 0.0,
            max: 2000.0,
            major_tick: 200.0,
            minor_tick: 100.0,
            start_angle: -90.0,
            sweep: -360.0,
            label_divisor: 100.0,
            cardinal_step: Some(36.0),
            labels: vec![
                LabelLine::new("ALTITUDE", 0.0, -45.0, 16.0),
                LabelLine::new("x100 M", 0.0, -27.0, 16.0).colored(Color::WHITE),
            ],
            readout_offset: Point::new(0.0, 30.0),
            readout_format: ValueFormat::Integer,
            label_inset: 35.0,
            ..Self::default()
        }
    }

    /// Vertical speed indicator: ±20 m/s, climb on the upper half, zero at
    /// nine o'clock.
    pub fn vertical_speed() -> Self {
        Self {
            channel: Channel::ClimbRate,
            min: -20.0,
            max: 20.0,
            major_tick: 10.0,
            minor_tick: 2.0,
            start_angle: 0.0,
            sweep: 360.0,
            label_abs: true,
            cardinal_step: Some(90.0),
            labels: vec![
                LabelLine::new("VERTICAL SPEED", 0.0, -55.0, 16.0),
                LabelLine::new("M/S", 0.0, -40.0, 16.0).colored(Color::WHITE),
                LabelLine::new("UP", -42.0, -22.0, 18.0).colored(Color::WHITE),
                LabelLine::new("DOWN", -42.0, 22.0, 18.0).colored(Color::WHITE),
            ],
            readout_offset: Point::new(0.0, 40.0),
            readout_format: ValueFormat::SignedOneDecimal,
            label_inset: 30.0,
            ..Self::default()
        }
    }

    /// Reject empty ranges, bad tick spacing and bad sweeps
    pub fn validate(&self) -> Result<(), RenderError> {
        if !(self.min.is_finite() && self.max.is_finite() && self.min < self.max) {
            return Err(RenderError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        for tick in [self.major_tick, self.minor_tick] {
            if !(tick.is_finite() && tick > 0.0) {
                return Err(RenderError::InvalidTick(tick));
            }
        }
        if (self.max - self.min) / self.minor_tick > MAX_TICKS {
            return Err(RenderError::InvalidTick(self.minor_tick));
        }
        if let Some(step) = self.cardinal_step {
            if !(step.is_finite() && step > 0.0 && 360.0 / step <= MAX_TICKS) {
                return Err(RenderError::InvalidTick(step));
            }
        }
        if !(self.sweep.is_finite() && self.sweep != 0.0 && self.sweep.abs() <= 360.0) {
            return Err(RenderError::InvalidSweep(self.sweep));
        }
        if !(self.label_divisor.is_finite() && self.label_divisor != 0.0) {
            return Err(RenderError::InvalidTick(self.label_divisor));
        }
        Ok(())
    }

    /// Clamp a value into the scale range.
    ///
    /// Returns the clamped value and whether clamping happened. Non-finite
    /// input pins to `min`.
    pub fn clamp(&self, value: f64) -> (f64, bool) {
        if !value.is_finite() {
            (self.min, true)
        } else if value < self.min {
            (self.min, true)
        } else if value > self.max {
            (self.max, true)
        } else {
            (value, false)
        }
    }

    /// Screen angle of the needle for `value`, clamped to the drawn arc.
    pub fn needle_angle(&self, value: f64) -> f64 {
        let (clamped, _) = self.clamp(value);
        self.start_angle + (clamped - self.min) / (self.max - self.min) * self.sweep
    }

    /// Needle polygon for a gauge of the given radius.
    pub fn needle(&self, value: f64, center: Point, radius: f64) -> NeedleGeometry {
        let (_, over_range) = self.clamp(value);
        let angle = self.needle_angle(value);
        NeedleGeometry {
            angle,
            over_range,
            points: needle_polygon(center, angle, radius - self.needle_margin, NEEDLE_WING_LENGTH),
        }
    }

    /// Tick marks from `min` to `max` at `minor_tick` spacing.
    ///
    /// On a full-turn scale the tick at `max` would sit on top of the tick
    /// at `min` and is left out.
    pub fn ticks(&self) -> Vec<ScaleTick> {
        let span = self.max - self.min;
        let count = (span / self.minor_tick + EPSILON).floor() as usize;
        let full_turn = (self.sweep.abs() - 360.0).abs() < EPSILON;

        let mut ticks = Vec::with_capacity(count + 1);
        for i in 0..=count {
            let value = self.min + i as f64 * self.minor_tick;
            if full_turn && i > 0 && (value - self.max).abs() < EPSILON * span.max(1.0) {
                continue;
            }
            let major = is_multiple(value, self.major_tick);
            ticks.push(ScaleTick {
                value,
                angle: self.needle_angle(value),
                major,
                label: major.then(|| self.tick_label(value)),
            });
        }
        ticks
    }

    fn tick_label(&self, value: f64) -> String {
        let mut shown = value / self.label_divisor;
        if self.label_abs {
            shown = shown.abs();
        }
        if (shown - shown.round()).abs() < 1e-6 {
            // avoid printing "-0"
            format!("{}", shown.round() as i64)
        } else {
            format!("{:.1}", shown)
        }
    }
}

fn is_multiple(value: f64, step: f64) -> bool {
    let ratio = value / step;
    (ratio - ratio.round()).abs() < 1e-6
}

/// Draw a circular scale gauge centered on `center`.
pub fn render_circular_scale(
    value: f64,
    spec: &ScaleSpec,
    center: Point,
    radius: f64,
    palette: &Palette,
) -> Result<Vec<DrawCommand>, RenderError> {
    spec.validate()?;
    if !(radius.is_finite() && radius > spec.bezel_width) {
        return Err(RenderError::InvalidSize {
            width: radius * 2.0,
            height: radius * 2.0,
        });
    }

    let rim = radius - spec.bezel_width;
    let mut cmds = vec![
        DrawCommand::filled_circle(center, rim, palette.face),
        DrawCommand::ring(center, radius - spec.bezel_width / 2.0, palette.marking, spec.bezel_width),
    ];

    for label in &spec.labels {
        cmds.push(DrawCommand::text(
            label.text.clone(),
            center.offset(label.offset.x, label.offset.y),
            label.font_size,
            label.color.unwrap_or(palette.label),
        ));
    }

    if let Some(step) = spec.cardinal_step {
        let count = (360.0 / step).round() as usize;
        for k in 0..count {
            let angle = spec.start_angle + k as f64 * step;
            cmds.push(DrawCommand::line(
                Point::polar(center, rim, angle),
                Point::polar(center, rim - MAJOR_TICK_LENGTH, angle),
                palette.marking,
                TICK_WIDTH,
            ));
        }
    }

    for tick in spec.ticks() {
        let length = if tick.major {
            MAJOR_TICK_LENGTH
        } else {
            MINOR_TICK_LENGTH
        };
        cmds.push(DrawCommand::line(
            Point::polar(center, rim, tick.angle),
            Point::polar(center, rim - length, tick.angle),
            palette.marking,
            TICK_WIDTH,
        ));
        if let Some(label) = tick.label {
            cmds.push(DrawCommand::text(
                label,
                Point::polar(center, radius - spec.label_inset, tick.angle),
                TICK_FONT_SIZE,
                palette.marking,
            ));
        }
    }

    let needle = spec.needle(value, center, radius);
    cmds.push(DrawCommand::Polygon {
        points: needle.points.to_vec(),
        fill: if needle.over_range {
            palette.over_range
        } else {
            palette.marking
        },
    });

    cmds.push(DrawCommand::text(
        spec.readout_format.format(value),
        center.offset(spec.readout_offset.x, spec.readout_offset.y),
        READOUT_FONT_SIZE,
        palette.marking,
    ));

    Ok(cmds)
}
