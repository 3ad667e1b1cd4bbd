//! Text-box readouts: a sunken box with a caption and a large value.

use serde::{Deserialize, Serialize};

use super::{Channel, RenderError, ValueFormat};
use crate::render::{bevel_lines, Color, DrawCommand, Point, Size, Palette};

/// A bordered text readout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBoxSpec {
    /// Value shown in the box
    pub channel: Channel,
    /// One or two caption lines
    pub label_lines: Vec<String>,
    /// Appended to the value, e.g. `%` or ` °C`
    pub unit: Option<String>,
    /// How the value is printed
    pub format: ValueFormat,
    /// Width of the sunken border
    pub bezel_width: f64,
    /// Caption font size
    pub label_font_size: f64,
    /// Value font size
    pub value_font_size: f64,
}

impl Default for TextBoxSpec {
    fn default() -> Self {
        Self {
            channel: Channel::FuelPercent,
            label_lines: Vec::new(),
            unit: None,
            format: ValueFormat::Integer,
            bezel_width: 3.0,
            label_font_size: 16.0,
            value_font_size: 24.0,
        }
    }
}

impl TextBoxSpec {
    fn preset(channel: Channel, lines: &[&str], unit: Option<&str>) -> Self {
        Self {
            channel,
            label_lines: lines.iter().map(|l| l.to_string()).collect(),
            unit: unit.map(str::to_string),
            ..Self::default()
        }
    }

    /// Fuel charge in percent
    pub fn fuel() -> Self {
        Self::preset(Channel::FuelPercent, &["CHARGE"], Some("%"))
    }

    /// Wall-clock time
    pub fn clock() -> Self {
        Self::preset(Channel::Clock, &["TIME"], None)
    }

    /// Engine speed
    pub fn rpm() -> Self {
        Self::preset(Channel::EngineRpm, &["RPM"], None)
    }

    /// Outside air temperature
    pub fn outside_temp() -> Self {
        Self::preset(Channel::OutsideAirTemp, &["TEMP", "OUTSIDE"], Some(" °C"))
    }

    /// Engine temperature
    pub fn engine_temp() -> Self {
        Self::preset(Channel::EngineTemp, &["TEMP", "ENGINE"], Some(" °C"))
    }

    /// Oil quantity in liters
    pub fn oil() -> Self {
        Self::preset(Channel::OilQuantity, &["OIL", "QTY"], Some(" L"))
    }

    /// Format a numeric value with the unit suffix
    pub fn display(&self, value: f64) -> String {
        let mut text = self.format.format(value);
        if let Some(unit) = &self.unit {
            text.push_str(unit);
        }
        text
    }
}

/// Draw a text box with `value` already formatted.
pub fn render_text_box(
    value: &str,
    spec: &TextBoxSpec,
    origin: Point,
    size: Size,
    palette: &Palette,
) -> Result<Vec<DrawCommand>, RenderError> {
    super::check_size(size)?;

    let mut cmds = vec![DrawCommand::Rect {
        origin,
        size,
        fill: palette.face,
    }];
    cmds.extend(bevel_lines(
        origin,
        size,
        Color::WHITE,
        Color::BLACK,
        spec.bezel_width,
        false,
    ));

    let cx = origin.x + size.width / 2.0;
    let value_y = match spec.label_lines.as_slice() {
        [] => size.height / 2.0,
        [line] => {
            cmds.push(DrawCommand::text(
                line.clone(),
                Point::new(cx, origin.y + 15.0),
                spec.label_font_size,
                palette.label,
            ));
            size.height / 2.0 + 8.0
        }
        [first, second, ..] => {
            for (text, dy) in [(first, 10.0), (second, 25.0)] {
                cmds.push(DrawCommand::text(
                    text.clone(),
                    Point::new(cx, origin.y + dy),
                    spec.label_font_size,
                    palette.label,
                ));
            }
            size.height / 2.0 + 13.0
        }
    };

    cmds.push(DrawCommand::text(
        value,
        Point::new(cx, origin.y + value_y),
        spec.value_font_size,
        palette.marking,
    ));
    Ok(cmds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_appends_unit() {
        assert_eq!(TextBoxSpec::fuel().display(73.4), "73%");
        assert_eq!(TextBoxSpec::outside_temp().display(19.0), "19 °C");
        assert_eq!(TextBoxSpec::oil().display(9.0), "9 L");
        assert_eq!(TextBoxSpec::rpm().display(f64::NAN), "---");
    }

    #[test]
    fn test_two_line_caption_pushes_value_down() {
        let palette = Palette::default();
        let cmds = render_text_box("690 °C", &TextBoxSpec::engine_temp(), Point::new(0.0, 0.0), Size::new(100.0, 60.0), &palette).unwrap();
        let texts: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, position, .. } => Some((text.as_str(), position.y)),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec![("TEMP", 10.0), ("ENGINE", 25.0), ("690 °C", 43.0)]);
    }

    #[test]
    fn test_invalid_box_size() {
        let result = render_text_box("1", &TextBoxSpec::rpm(), Point::default(), Size::new(-1.0, 60.0), &Palette::default());
        assert!(result.is_err());
    }
}
