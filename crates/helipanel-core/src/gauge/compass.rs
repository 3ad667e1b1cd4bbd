//! Heading-up compass card.
//!
//! The card turns under a fixed pointer at twelve o'clock: bearing `b` is
//! drawn at screen angle `b - 90 - heading`. The heading is normalized into
//! `[0, 360)` first, so headings one full turn apart give the same layout.

use serde::{Deserialize, Serialize};

use super::{needle_polygon, LabelLine, RenderError};
use crate::render::{DrawCommand, Palette, Point};
use crate::unit_conversion::normalize_degrees;

const TICK_STEP: u16 = 10;
const LABEL_STEP: u16 = 30;
const MAJOR_TICK_LENGTH: f64 = 15.0;
const MINOR_TICK_LENGTH: f64 = 8.0;
const LABEL_FONT_SIZE: f64 = 24.0;

/// Layout of the compass face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompassSpec {
    /// Width of the outer ring
    pub bezel_width: f64,
    /// Distance of bearing labels from the rim
    pub label_inset: f64,
    /// Gap between the pointer tip and the rim
    pub pointer_margin: f64,
    /// Static captions on the face
    pub labels: Vec<LabelLine>,
    /// Offset of the three-digit heading readout from the center
    pub readout_offset: Option<Point>,
}

impl Default for CompassSpec {
    fn default() -> Self {
        Self {
            bezel_width: 5.0,
            label_inset: 30.0,
            pointer_margin: 20.0,
            labels: vec![LabelLine::new("HDG", 40.0, 22.0, 24.0)],
            readout_offset: Some(Point::new(0.0, 40.0)),
        }
    }
}

/// One bearing mark on the card.
#[derive(Debug, Clone, PartialEq)]
pub struct CompassTick {
    /// Bearing in degrees, 0..=350
    pub bearing: u16,
    /// Screen angle where the tick is drawn
    pub angle: f64,
    /// Long labeled tick every 30 degrees
    pub major: bool,
    /// Bearing label, major ticks only
    pub label: Option<String>,
}

/// Screen angle of `bearing` for the given heading.
pub fn tick_screen_angle(bearing: f64, heading_deg: f64) -> f64 {
    bearing - 90.0 - normalize_degrees(heading_deg)
}

/// Bearing label: cardinal letters, otherwise tens of degrees.
pub fn bearing_label(bearing: u16) -> String {
    match bearing {
        0 => "N".to_string(),
        90 => "E".to_string(),
        180 => "S".to_string(),
        270 => "W".to_string(),
        b => (b / 10).to_string(),
    }
}

/// All 36 ticks of the card for `heading_deg`.
pub fn compass_ticks(heading_deg: f64) -> Vec<CompassTick> {
    (0..360)
        .step_by(TICK_STEP as usize)
        .map(|bearing: u16| {
            let major = bearing % LABEL_STEP == 0;
            CompassTick {
                bearing,
                angle: tick_screen_angle(bearing as f64, heading_deg),
                major,
                label: major.then(|| bearing_label(bearing)),
            }
        })
        .collect()
}

/// Draw the compass card for `heading_deg` (degrees, any range).
pub fn render_heading_compass(
    heading_deg: f64,
    spec: &CompassSpec,
    center: Point,
    radius: f64,
    palette: &Palette,
) -> Result<Vec<DrawCommand>, RenderError> {
    if !(radius.is_finite() && radius > spec.bezel_width) {
        return Err(RenderError::InvalidSize {
            width: radius * 2.0,
            height: radius * 2.0,
        });
    }
    // an unknown heading leaves the card at north rather than blanking it
    let heading = if heading_deg.is_finite() {
        normalize_degrees(heading_deg)
    } else {
        0.0
    };

    let rim = radius - spec.bezel_width;
    let mut cmds = vec![
        DrawCommand::ring(center, radius - spec.bezel_width / 2.0, palette.marking, spec.bezel_width),
        DrawCommand::filled_circle(center, rim, palette.face),
    ];

    for tick in compass_ticks(heading) {
        let length = if tick.major {
            MAJOR_TICK_LENGTH
        } else {
            MINOR_TICK_LENGTH
        };
        if let Some(label) = tick.label {
            cmds.push(DrawCommand::text(
                label,
                Point::polar(center, radius - spec.label_inset, tick.angle),
                LABEL_FONT_SIZE,
                palette.marking,
            ));
        }
        cmds.push(DrawCommand::line(
            Point::polar(center, rim, tick.angle),
            Point::polar(center, rim - length, tick.angle),
            palette.marking,
            2.0,
        ));
    }

    cmds.push(DrawCommand::Polygon {
        points: needle_polygon(center, -90.0, radius - spec.pointer_margin, 10.0).to_vec(),
        fill: palette.marking,
    });

    for label in &spec.labels {
        cmds.push(DrawCommand::text(
            label.text.clone(),
            center.offset(label.offset.x, label.offset.y),
            label.font_size,
            label.color.unwrap_or(palette.label),
        ));
    }

    if let Some(offset) = spec.readout_offset {
        // 359.6 rounds to 360, which reads as 000 on a compass
        let shown = (heading.round() as u32) % 360;
        cmds.push(DrawCommand::text(
            format!("{:03}", shown),
            center.offset(offset.x, offset.y),
            LABEL_FONT_SIZE,
            palette.marking,
        ));
    }

    Ok(cmds)
}
