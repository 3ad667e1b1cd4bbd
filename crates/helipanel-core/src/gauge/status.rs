//! Fault status strip.
//!
//! A single row of equal slots, centered in the gauge box. Slot `i` shows
//! fault flag `i`: alert fill when active, ok fill otherwise. Slots past the
//! end of the flag list stay empty.

use serde::{Deserialize, Serialize};

use super::RenderError;
use crate::render::{bevel_lines, Color, DrawCommand, Palette, Point, Size};
use crate::telemetry::FaultFlag;

/// Layout of the status strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusStripSpec {
    /// Number of slots in the row
    pub slot_count: usize,
    /// Size of each slot
    pub slot_size: Size,
    /// Horizontal gap between slots
    pub spacing: f64,
    /// Abbreviation font size
    pub font_size: f64,
    /// Width of the raised slot edge
    pub bevel_width: f64,
}

impl Default for StatusStripSpec {
    fn default() -> Self {
        Self {
            slot_count: 10,
            slot_size: Size::new(100.0, 30.0),
            spacing: 10.0,
            font_size: 16.0,
            bevel_width: 2.0,
        }
    }
}

impl StatusStripSpec {
    /// Reject an empty row, zero-size slots and bad spacing
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.slot_count == 0 || !self.slot_size.is_positive() {
            return Err(RenderError::InvalidSize {
                width: self.slot_size.width * self.slot_count as f64,
                height: self.slot_size.height,
            });
        }
        if !(self.spacing.is_finite() && self.spacing >= 0.0) {
            return Err(RenderError::InvalidTick(self.spacing));
        }
        Ok(())
    }

    /// Total width of the row
    pub fn row_width(&self) -> f64 {
        let n = self.slot_count as f64;
        n * self.slot_size.width + (n - 1.0).max(0.0) * self.spacing
    }
}

/// One resolved slot of the strip.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSlot {
    /// Top-left corner
    pub origin: Point,
    /// Slot size
    pub size: Size,
    /// Alert or ok fill
    pub fill: Color,
    /// Fault abbreviation, `None` for unused slots
    pub abbreviation: Option<String>,
}

/// Resolve slot positions and fills for a strip occupying `origin`/`size`.
pub fn status_slots(
    flags: &[FaultFlag],
    spec: &StatusStripSpec,
    origin: Point,
    size: Size,
    palette: &Palette,
) -> Vec<StatusSlot> {
    let x0 = origin.x + (size.width - spec.row_width()) / 2.0;
    let y = origin.y + (size.height - spec.slot_size.height) / 2.0;

    (0..spec.slot_count)
        .map(|i| {
            let flag = flags.get(i);
            let active = flag.is_some_and(|f| f.is_active);
            StatusSlot {
                origin: Point::new(x0 + i as f64 * (spec.slot_size.width + spec.spacing), y),
                size: spec.slot_size,
                fill: if active { palette.alert } else { palette.ok },
                abbreviation: flag.map(|f| f.abbreviation.clone()),
            }
        })
        .collect()
}

/// Draw the strip for the given flags.
pub fn render_status_strip(
    flags: &[FaultFlag],
    spec: &StatusStripSpec,
    origin: Point,
    size: Size,
    palette: &Palette,
) -> Result<Vec<DrawCommand>, RenderError> {
    spec.validate()?;

    let mut cmds = Vec::with_capacity(spec.slot_count * 6);
    for slot in status_slots(flags, spec, origin, size, palette) {
        cmds.push(DrawCommand::Rect {
            origin: slot.origin,
            size: slot.size,
            fill: slot.fill,
        });
        cmds.extend(bevel_lines(
            slot.origin,
            slot.size,
            Color::WHITE,
            Color::BLACK,
            spec.bevel_width,
            true,
        ));
        if let Some(abbr) = slot.abbreviation {
            cmds.push(DrawCommand::text(
                abbr,
                slot.origin.offset(slot.size.width / 2.0, slot.size.height / 2.0),
                spec.font_size,
                palette.marking,
            ));
        }
    }
    Ok(cmds)
}
