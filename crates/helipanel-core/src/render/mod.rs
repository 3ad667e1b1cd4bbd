//! Frame model and drawing primitives.
//!
//! A [`Frame`] is a flat display list of [`DrawCommand`]s in panel pixel
//! coordinates (origin top-left, y grows downward). Gauges emit commands,
//! the presentation host rasterizes or serializes them.

mod color;
mod svg;

pub use color::{Color, Palette};
pub use svg::{write_svg, write_svg_file, SvgWriteError};

use serde::{Deserialize, Serialize};

/// A point in panel pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal, growing right
    pub x: f64,
    /// Vertical, growing down
    pub y: f64,
}

impl Point {
    /// Point at `(x, y)`
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by `(dx, dy)`
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Point at `radius` from `center` along a screen angle in degrees.
    ///
    /// Screen angles: 0° points right and positive angles turn clockwise,
    /// so -90° points straight up.
    pub fn polar(center: Point, radius: f64, angle_deg: f64) -> Self {
        let rad = angle_deg.to_radians();
        Self::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
    }

    /// Rotate about `pivot` by a screen angle (clockwise positive).
    pub fn rotate_about(self, pivot: Point, angle_deg: f64) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        Self::new(pivot.x + dx * cos - dy * sin, pivot.y + dx * sin + dy * cos)
    }

    /// Euclidean distance
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

impl Size {
    /// Size of `width` by `height`
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Square of side `side`
    pub const fn square(side: f64) -> Self {
        Self::new(side, side)
    }

    /// Both sides are greater than zero
    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Horizontal text alignment relative to the text position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    /// Text begins at the position
    Start,
    /// Text is centered on the position
    #[default]
    Middle,
    /// Text ends at the position
    End,
}

/// Outline of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Outline color
    pub color: Color,
    /// Outline width
    pub width: f64,
}

/// One drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Straight segment
    Line {
        /// Start point
        from: Point,
        /// End point
        to: Point,
        /// Stroke color
        color: Color,
        /// Stroke width
        width: f64,
    },
    /// Filled closed polygon
    Polygon {
        /// Vertices in order
        points: Vec<Point>,
        /// Fill color
        fill: Color,
    },
    /// Disc, ring or both
    Circle {
        /// Circle center
        center: Point,
        /// Circle radius
        radius: f64,
        /// Interior fill, if any
        fill: Option<Color>,
        /// Outline, if any
        stroke: Option<Stroke>,
    },
    /// Filled axis-aligned rectangle
    Rect {
        /// Top-left corner
        origin: Point,
        /// Width and height
        size: Size,
        /// Fill color
        fill: Color,
    },
    /// Text centered vertically on `position`
    Text {
        /// String to draw
        text: String,
        /// Anchor point
        position: Point,
        /// Font size in pixels
        font_size: f64,
        /// Text color
        color: Color,
        /// Horizontal alignment
        anchor: TextAnchor,
    },
    /// Nested commands clipped to a circle
    ClipCircle {
        /// Clip center
        center: Point,
        /// Clip radius
        radius: f64,
        /// Commands drawn inside the clip
        commands: Vec<DrawCommand>,
    },
}

impl DrawCommand {
    /// Line segment
    pub fn line(from: Point, to: Point, color: Color, width: f64) -> Self {
        Self::Line {
            from,
            to,
            color,
            width,
        }
    }

    /// Centered text
    pub fn text(text: impl Into<String>, position: Point, font_size: f64, color: Color) -> Self {
        Self::Text {
            text: text.into(),
            position,
            font_size,
            color,
            anchor: TextAnchor::Middle,
        }
    }

    /// Disc without outline
    pub fn filled_circle(center: Point, radius: f64, fill: Color) -> Self {
        Self::Circle {
            center,
            radius,
            fill: Some(fill),
            stroke: None,
        }
    }

    /// Outline without fill
    pub fn ring(center: Point, radius: f64, color: Color, width: f64) -> Self {
        Self::Circle {
            center,
            radius,
            fill: None,
            stroke: Some(Stroke { color, width }),
        }
    }

    /// Text content, if this is a text command
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Four edge lines giving a box a beveled look.
///
/// Raised boxes are light on the top and left edges; sunken boxes swap the
/// colors.
pub fn bevel_lines(
    origin: Point,
    size: Size,
    light: Color,
    dark: Color,
    width: f64,
    raised: bool,
) -> [DrawCommand; 4] {
    let (top_left, bottom_right) = if raised { (light, dark) } else { (dark, light) };
    let tl = origin;
    let tr = origin.offset(size.width, 0.0);
    let bl = origin.offset(0.0, size.height);
    let br = origin.offset(size.width, size.height);
    [
        DrawCommand::line(tl, tr, top_left, width),
        DrawCommand::line(tl, bl, top_left, width),
        DrawCommand::line(tr, br, bottom_right, width),
        DrawCommand::line(bl, br, bottom_right, width),
    ]
}

/// The rendered output of one panel pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Panel width in pixels
    pub width: f64,
    /// Panel height in pixels
    pub height: f64,
    /// Clear color
    pub background: Color,
    /// Draw commands in painter order
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    /// Empty frame
    pub fn new(width: f64, height: f64, background: Color) -> Self {
        Self {
            width,
            height,
            background,
            commands: Vec::new(),
        }
    }

    /// Append commands
    pub fn extend(&mut self, commands: impl IntoIterator<Item = DrawCommand>) {
        self.commands.extend(commands);
    }

    /// All text strings in drawing order, including clipped groups
    pub fn texts(&self) -> Vec<&str> {
        fn collect<'a>(commands: &'a [DrawCommand], out: &mut Vec<&'a str>) {
            for cmd in commands {
                match cmd {
                    DrawCommand::Text { text, .. } => out.push(text),
                    DrawCommand::ClipCircle { commands, .. } => collect(commands, out),
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.commands, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        a.distance_to(b) < 1e-9
    }

    #[test]
    fn test_polar_screen_angles() {
        let c = Point::new(100.0, 100.0);
        assert!(close(Point::polar(c, 10.0, 0.0), Point::new(110.0, 100.0)));
        assert!(close(Point::polar(c, 10.0, 90.0), Point::new(100.0, 110.0)));
        assert!(close(Point::polar(c, 10.0, -90.0), Point::new(100.0, 90.0)));
    }

    #[test]
    fn test_rotate_about_matches_polar() {
        let c = Point::new(5.0, -3.0);
        let p = Point::polar(c, 7.0, 20.0);
        let rotated = p.rotate_about(c, 35.0);
        assert!(close(rotated, Point::polar(c, 7.0, 55.0)));
    }

    #[test]
    fn test_bevel_colors_swap_when_sunken() {
        let raised = bevel_lines(Point::default(), Size::new(10.0, 5.0), Color::WHITE, Color::BLACK, 2.0, true);
        let sunken = bevel_lines(Point::default(), Size::new(10.0, 5.0), Color::WHITE, Color::BLACK, 2.0, false);
        match (&raised[0], &sunken[0]) {
            (DrawCommand::Line { color: a, .. }, DrawCommand::Line { color: b, .. }) => {
                assert_eq!(*a, Color::WHITE);
                assert_eq!(*b, Color::BLACK);
            }
            _ => panic!("expected lines"),
        }
    }

    #[test]
    fn test_frame_texts_descend_into_clip_groups() {
        let mut frame = Frame::new(10.0, 10.0, Color::BLACK);
        frame.extend([
            DrawCommand::text("a", Point::default(), 10.0, Color::WHITE),
            DrawCommand::ClipCircle {
                center: Point::default(),
                radius: 1.0,
                commands: vec![DrawCommand::text("b", Point::default(), 10.0, Color::WHITE)],
            },
        ]);
        assert_eq!(frame.texts(), vec!["a", "b"]);
    }
}
