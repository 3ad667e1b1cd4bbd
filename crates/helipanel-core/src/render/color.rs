//! Colors and the panel palette.

use serde::{Deserialize, Serialize};
use std::fmt;

/// RGBA color. Serialized as a CSS hex string (`#rrggbb` or `#rrggbbaa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red component
    pub red: u8,
    /// Green component
    pub green: u8,
    /// Blue component
    pub blue: u8,
    /// Opacity, 255 is opaque
    pub alpha: u8,
}

impl Color {
    /// Opaque black
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Opaque red
    pub const RED: Color = Color::rgb(255, 0, 0);
    /// Opaque yellow
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    /// Opaque color from components
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 255,
        }
    }

    /// Convert to CSS hex color
    pub fn to_css_hex(&self) -> String {
        if self.alpha == 255 {
            format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                self.red, self.green, self.blue, self.alpha
            )
        }
    }

    /// Create from CSS hex color
    pub fn from_css_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self {
                red: channel(0)?,
                green: channel(2)?,
                blue: channel(4)?,
                alpha: channel(6)?,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_css_hex(&value).ok_or_else(|| format!("invalid color '{value}'"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_css_hex()
    }
}

/// Colors shared by every gauge on the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Panel background
    pub background: Color,
    /// Inactive status slot
    pub ok: Color,
    /// Active status slot
    pub alert: Color,
    /// Needle color when the value is outside the drawn scale
    pub over_range: Color,
    /// Gauge face
    pub face: Color,
    /// Ticks, bezels and needles
    pub marking: Color,
    /// Default caption color
    pub label: Color,
    /// Attitude sphere sky
    pub sky: Color,
    /// Attitude sphere ground
    pub ground: Color,
    /// Aircraft symbol center
    pub aircraft_dot: Color,
    /// Aircraft symbol wings
    pub aircraft_wings: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::rgb(100, 100, 100),
            ok: Color::rgb(0, 100, 0),
            alert: Color::rgb(100, 0, 0),
            over_range: Color::RED,
            face: Color::BLACK,
            marking: Color::WHITE,
            label: Color::YELLOW,
            sky: Color::rgb(0, 21, 140),
            ground: Color::rgb(139, 69, 19),
            aircraft_dot: Color::RED,
            aircraft_wings: Color::YELLOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_hex_parsing() {
        assert_eq!(Color::from_css_hex("#00158c"), Some(Color::rgb(0, 21, 140)));
        assert_eq!(Color::from_css_hex("8b4513"), Some(Color::rgb(139, 69, 19)));
        let translucent = Color::from_css_hex("#ff000080").unwrap();
        assert_eq!(translucent.alpha, 0x80);
        assert_eq!(Color::from_css_hex("#12345"), None);
        assert_eq!(Color::from_css_hex("#zzzzzz"), None);
        assert_eq!(Color::from_css_hex("#ééé"), None);
    }

    #[test]
    fn test_css_hex_output() {
        assert_eq!(Color::rgb(100, 100, 100).to_css_hex(), "#646464");
        let c = Color {
            alpha: 0,
            ..Color::WHITE
        };
        assert_eq!(c.to_css_hex(), "#ffffff00");
    }

    #[test]
    fn test_palette_serializes_as_hex() {
        let json = serde_json::to_string(&Palette::default()).unwrap();
        assert!(json.contains("\"sky\":\"#00158c\""));
        let back: Palette = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Palette::default());
    }
}
