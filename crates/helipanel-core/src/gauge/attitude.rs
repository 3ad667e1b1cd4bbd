//! Attitude sphere (artificial horizon).
//!
//! Geometry is computed in a horizon frame centered on the viewport, x to
//! the right and y down. Pitch shifts the horizon by `pitch * px_per_deg`
//! (nose up moves it down), then everything that belongs to the outside
//! world (sky, ground, pitch ladder, roll scale) turns by the roll angle,
//! counter-clockwise on screen for a right bank. The aircraft symbol is
//! fixed to the viewport.

use serde::{Deserialize, Serialize};

use super::RenderError;
use crate::render::{DrawCommand, Palette, Point, Size};

const LADDER_LABEL_GAP: f64 = 15.0;
const ROLL_MAJOR_LENGTH: f64 = 15.0;
const ROLL_MINOR_LENGTH: f64 = 8.0;
const FONT_SIZE: f64 = 24.0;

/// One pitch ladder rung.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LadderRung {
    /// Pitch the rung marks
    pub pitch_deg: f64,
    /// Half width of the rung in pixels
    pub half_length: f64,
    /// Print the pitch value beside the rung
    pub labeled: bool,
}

/// Layout of the attitude sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttitudeSpec {
    /// Vertical pixels per degree of pitch, shared by background and ladder
    pub pixels_per_degree: f64,
    /// Width of the outer ring holding the roll scale
    pub bezel_width: f64,
    /// Roll scale tick spacing, degrees
    pub roll_tick_step: u16,
    /// Roll scale label spacing, degrees
    pub roll_label_step: u16,
    /// Pitch ladder rungs
    pub ladder: Vec<LadderRung>,
    /// Radius of the aircraft symbol dot
    pub dot_radius: f64,
    /// Length of each wing strip
    pub wing_length: f64,
    /// Thickness of each wing strip
    pub wing_thickness: f64,
    /// Gap between the center and the inner end of each wing strip
    pub wing_offset: f64,
}

impl Default for AttitudeSpec {
    fn default() -> Self {
        let mut ladder = Vec::new();
        for pitch in [-20.0, -10.0, -5.0, 5.0, 10.0, 20.0] {
            let (half_length, labeled) = match f64::abs(pitch) as u32 {
                20 => (20.0, true),
                10 => (15.0, true),
                _ => (10.0, false),
            };
            ladder.push(LadderRung {
                pitch_deg: pitch,
                half_length,
                labeled,
            });
        }
        Self {
            pixels_per_degree: 2.0,
            bezel_width: 15.0,
            roll_tick_step: 10,
            roll_label_step: 30,
            ladder,
            dot_radius: 6.0,
            wing_length: 40.0,
            wing_thickness: 6.0,
            wing_offset: 30.0,
        }
    }
}

/// Resolved positions for one attitude.
#[derive(Debug, Clone, PartialEq)]
pub struct AttitudeGeometry {
    /// Center of the sphere
    pub center: Point,
    /// Radius of the sphere
    pub radius: f64,
    /// Roll after sanitizing
    pub roll_deg: f64,
    /// Pitch after sanitizing and limiting
    pub pitch_deg: f64,
    /// Horizon displacement in the horizon frame, pixels, positive down
    pub horizon_offset: f64,
    /// Left and right ends of the horizon line
    pub horizon: [Point; 2],
    /// Sky polygon
    pub sky: [Point; 4],
    /// Ground polygon
    pub ground: [Point; 4],
    pixels_per_degree: f64,
}

impl AttitudeGeometry {
    /// Compute the geometry for a viewport of diameter `size`.
    ///
    /// Non-finite angles are treated as level flight; pitch is limited to
    /// ±90°.
    pub fn new(roll_rad: f64, pitch_rad: f64, center: Point, size: f64, spec: &AttitudeSpec) -> Self {
        let roll_deg = finite_or_zero(roll_rad.to_degrees());
        let pitch_deg = finite_or_zero(pitch_rad.to_degrees()).clamp(-90.0, 90.0);

        // oversized backdrop so rotation never exposes a corner
        let half_width = size * 1.5 / 2.0;
        let half_height = size * 2.0 / 2.0;
        let horizon_offset = (pitch_deg * spec.pixels_per_degree).clamp(-half_height, half_height);

        let mut geom = Self {
            center,
            radius: size / 2.0,
            roll_deg,
            pitch_deg,
            horizon_offset,
            horizon: [Point::default(); 2],
            sky: [Point::default(); 4],
            ground: [Point::default(); 4],
            pixels_per_degree: spec.pixels_per_degree,
        };

        geom.horizon = [
            geom.project(-half_width, horizon_offset),
            geom.project(half_width, horizon_offset),
        ];
        geom.sky = [
            geom.project(-half_width, -half_height),
            geom.project(half_width, -half_height),
            geom.project(half_width, horizon_offset),
            geom.project(-half_width, horizon_offset),
        ];
        geom.ground = [
            geom.project(-half_width, horizon_offset),
            geom.project(half_width, horizon_offset),
            geom.project(half_width, half_height),
            geom.project(-half_width, half_height),
        ];
        geom
    }

    /// Map a horizon-frame point into panel coordinates.
    pub fn project(&self, x: f64, y: f64) -> Point {
        self.center
            .offset(x, y)
            .rotate_about(self.center, -self.roll_deg)
    }

    /// Horizon-frame y of the rung for `pitch_deg`
    pub fn rung_y(&self, pitch_deg: f64) -> f64 {
        self.horizon_offset - pitch_deg * self.pixels_per_degree
    }

    /// Screen angle of roll scale mark `mark_deg` (0 = top of the scale).
    pub fn roll_mark_angle(&self, mark_deg: f64) -> f64 {
        -90.0 + mark_deg - self.roll_deg
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Draw the attitude sphere in a square viewport of side `size`.
pub fn render_attitude_sphere(
    roll_rad: f64,
    pitch_rad: f64,
    spec: &AttitudeSpec,
    center: Point,
    size: f64,
    palette: &Palette,
) -> Result<Vec<DrawCommand>, RenderError> {
    if !(size.is_finite() && size > 2.0 * spec.bezel_width) {
        return Err(RenderError::InvalidSize {
            width: size,
            height: size,
        });
    }
    let geom = AttitudeGeometry::new(roll_rad, pitch_rad, center, size, spec);
    let radius = geom.radius;

    let mut world = vec![
        DrawCommand::Polygon {
            points: geom.sky.to_vec(),
            fill: palette.sky,
        },
        DrawCommand::Polygon {
            points: geom.ground.to_vec(),
            fill: palette.ground,
        },
        DrawCommand::line(geom.horizon[0], geom.horizon[1], palette.marking, 2.0),
    ];

    for rung in &spec.ladder {
        let y = geom.rung_y(rung.pitch_deg);
        world.push(DrawCommand::line(
            geom.project(-rung.half_length, y),
            geom.project(rung.half_length, y),
            palette.marking,
            2.0,
        ));
        if rung.labeled {
            let label = format!("{}", rung.pitch_deg.abs() as i64);
            let dx = rung.half_length + LADDER_LABEL_GAP;
            world.push(DrawCommand::text(label.clone(), geom.project(-dx, y), FONT_SIZE, palette.marking));
            world.push(DrawCommand::text(label, geom.project(dx, y), FONT_SIZE, palette.marking));
        }
    }

    let mut cmds = vec![DrawCommand::ClipCircle {
        center,
        radius,
        commands: world,
    }];

    let rim = radius - spec.bezel_width;
    let step = spec.roll_tick_step.max(1) as i32;
    let label_step = spec.roll_label_step.max(1) as i32;
    for mark in (-180..180).step_by(step as usize) {
        let angle = geom.roll_mark_angle(mark as f64);
        let major = mark % label_step == 0;
        let length = if major {
            ROLL_MAJOR_LENGTH
        } else {
            ROLL_MINOR_LENGTH
        };
        cmds.push(DrawCommand::line(
            Point::polar(center, rim, angle),
            Point::polar(center, rim - length, angle),
            palette.marking,
            2.0,
        ));
        if major {
            cmds.push(DrawCommand::text(
                mark.abs().to_string(),
                Point::polar(center, rim - length - 10.0, angle),
                FONT_SIZE,
                palette.marking,
            ));
        }
    }

    // aircraft reference, fixed to the viewport
    cmds.push(DrawCommand::filled_circle(center, spec.dot_radius, palette.aircraft_dot));
    let strip = Size::new(spec.wing_length, spec.wing_thickness);
    cmds.push(DrawCommand::Rect {
        origin: center.offset(-spec.wing_offset - spec.wing_length, -spec.wing_thickness / 2.0),
        size: strip,
        fill: palette.aircraft_wings,
    });
    cmds.push(DrawCommand::Rect {
        origin: center.offset(spec.wing_offset, -spec.wing_thickness / 2.0),
        size: strip,
        fill: palette.aircraft_wings,
    });

    cmds.push(DrawCommand::ring(
        center,
        radius - spec.bezel_width / 2.0,
        palette.face,
        spec.bezel_width,
    ));

    Ok(cmds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_default_ladder() {
        let spec = AttitudeSpec::default();
        assert_eq!(spec.ladder.len(), 6);
        let labeled: Vec<_> = spec
            .ladder
            .iter()
            .filter(|r| r.labeled)
            .map(|r| r.pitch_deg)
            .collect();
        assert_eq!(labeled, vec![-20.0, -10.0, 10.0, 20.0]);
    }

    #[test]
    fn test_nose_up_moves_horizon_down() {
        let c = Point::new(150.0, 150.0);
        let geom = AttitudeGeometry::new(0.0, 10f64.to_radians(), c, 300.0, &AttitudeSpec::default());
        assert!((geom.horizon_offset - 20.0).abs() < EPS);
        assert!((geom.horizon[0].y - 170.0).abs() < EPS);
    }

    #[test]
    fn test_right_bank_raises_right_side() {
        let c = Point::new(0.0, 0.0);
        let geom = AttitudeGeometry::new(20f64.to_radians(), 0.0, c, 300.0, &AttitudeSpec::default());
        let [left, right] = geom.horizon;
        assert!(right.y < left.y);
        let tilt = (left.y - right.y).atan2(right.x - left.x).to_degrees();
        assert!((tilt - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_rung_coincides_with_horizon() {
        let c = Point::new(10.0, 10.0);
        let geom = AttitudeGeometry::new(0.3, -0.1, c, 200.0, &AttitudeSpec::default());
        assert!((geom.rung_y(0.0) - geom.horizon_offset).abs() < EPS);
    }

    #[test]
    fn test_extreme_pitch_is_limited() {
        let geom = AttitudeGeometry::new(0.0, 3.0, Point::default(), 100.0, &AttitudeSpec::default());
        assert_eq!(geom.pitch_deg, 90.0);
        assert!(geom.horizon_offset <= 100.0);
    }

    #[test]
    fn test_roll_scale_turns_with_horizon() {
        let geom = AttitudeGeometry::new(30f64.to_radians(), 0.0, Point::default(), 300.0, &AttitudeSpec::default());
        assert!((geom.roll_mark_angle(0.0) + 120.0).abs() < 1e-9);
    }
}
