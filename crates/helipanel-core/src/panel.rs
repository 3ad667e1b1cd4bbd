//! Panel composition
//!
//! [`PanelRenderer`] turns one [`PanelInput`] into a [`Frame`] by rendering
//! every configured gauge in order. A gauge that fails is skipped and
//! reported once; the rest of the panel still draws.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::gauge::{
    render_attitude_sphere, render_circular_scale, render_heading_compass, render_status_strip,
    render_text_box, AttitudeSpec, Channel, CompassSpec, GaugeKind, GaugeSpec, RenderError,
    ScaleSpec, StatusStripSpec, TextBoxSpec,
};
use crate::render::{DrawCommand, Frame, Palette, Point, Size};
use crate::telemetry::{EngineReadings, FaultSet, TelemetrySample, TelemetrySnapshot};

/// Everything a render pass reads. Built once per tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelInput {
    /// Flight state
    pub sample: TelemetrySample,
    /// Engine readings
    pub engine: EngineReadings,
    /// Fault flags derived from the snapshot
    pub faults: FaultSet,
    /// Wall-clock time captured for this tick
    pub clock: NaiveTime,
}

impl PanelInput {
    /// Capture a snapshot and the clock for one render pass
    pub fn new(snapshot: &TelemetrySnapshot, clock: NaiveTime) -> Self {
        Self {
            sample: snapshot.sample,
            engine: snapshot.engine,
            faults: FaultSet::evaluate(snapshot),
            clock,
        }
    }

    /// Numeric value of a channel; `None` for the clock
    pub fn value(&self, channel: Channel) -> Option<f64> {
        let s = &self.sample;
        let e = &self.engine;
        match channel {
            Channel::Airspeed => Some(s.airspeed_kt),
            Channel::ClimbRate => Some(s.climb_rate_mps),
            Channel::Altitude => Some(s.altitude_m),
            Channel::HeightAboveGround => Some(s.height_above_ground_m),
            Channel::Heading => Some(s.heading_deg()),
            Channel::FuelPercent => Some(e.fuel_percent),
            Channel::EngineRpm => Some(e.rpm),
            Channel::OutsideAirTemp => Some(e.outside_air_temp_c),
            Channel::EngineTemp => Some(e.engine_temp_c),
            Channel::OilQuantity => Some(e.oil_liters),
            Channel::Clock => None,
        }
    }
}

/// Panel size, palette and gauge list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelLayout {
    /// Panel width in pixels
    pub width: f64,
    /// Panel height in pixels
    pub height: f64,
    /// Shared colors
    pub palette: Palette,
    /// Gauges in drawing order
    pub gauges: Vec<GaugeSpec>,
}

impl Default for PanelLayout {
    fn default() -> Self {
        let text_box = Size::new(100.0, 60.0);
        let round = Size::square(200.0);
        Self {
            width: 1200.0,
            height: 700.0,
            palette: Palette::default(),
            gauges: vec![
                GaugeSpec::new(
                    "status",
                    Point::new(0.0, 20.0),
                    Size::new(1200.0, 30.0),
                    GaugeKind::StatusStrip(StatusStripSpec::default()),
                ),
                GaugeSpec::new(
                    "attitude",
                    Point::new(450.0, 100.0),
                    Size::square(300.0),
                    GaugeKind::AttitudeSphere(AttitudeSpec::default()),
                ),
                GaugeSpec::new(
                    "heading",
                    Point::new(500.0, 450.0),
                    round,
                    GaugeKind::HeadingCompass(CompassSpec::default()),
                ),
                GaugeSpec::new(
                    "speed",
                    Point::new(150.0, 155.0),
                    round,
                    GaugeKind::CircularScale(ScaleSpec::airspeed()),
                ),
                GaugeSpec::new(
                    "vertical_speed",
                    Point::new(750.0, 400.0),
                    round,
                    GaugeKind::CircularScale(ScaleSpec::vertical_speed()),
                ),
                GaugeSpec::new(
                    "altitude",
                    Point::new(250.0, 400.0),
                    round,
                    GaugeKind::CircularScale(ScaleSpec::altimeter()),
                ),
                GaugeSpec::new("clock", Point::new(800.0, 100.0), text_box, GaugeKind::TextBox(TextBoxSpec::clock())),
                GaugeSpec::new("fuel", Point::new(800.0, 180.0), text_box, GaugeKind::TextBox(TextBoxSpec::fuel())),
                GaugeSpec::new("rpm", Point::new(800.0, 260.0), text_box, GaugeKind::TextBox(TextBoxSpec::rpm())),
                GaugeSpec::new(
                    "outside_temp",
                    Point::new(940.0, 100.0),
                    text_box,
                    GaugeKind::TextBox(TextBoxSpec::outside_temp()),
                ),
                GaugeSpec::new(
                    "engine_temp",
                    Point::new(940.0, 180.0),
                    text_box,
                    GaugeKind::TextBox(TextBoxSpec::engine_temp()),
                ),
                GaugeSpec::new("oil", Point::new(940.0, 260.0), text_box, GaugeKind::TextBox(TextBoxSpec::oil())),
            ],
        }
    }
}

impl PanelLayout {
    /// Look up a gauge by id
    pub fn gauge(&self, id: &str) -> Option<&GaugeSpec> {
        self.gauges.iter().find(|g| g.id == id)
    }
}

/// Render one gauge against the current input.
pub fn render_gauge(
    spec: &GaugeSpec,
    input: &PanelInput,
    palette: &Palette,
) -> Result<Vec<DrawCommand>, RenderError> {
    spec.validate()?;
    let center = spec.center();

    match &spec.kind {
        GaugeKind::CircularScale(scale) => {
            let value = input
                .value(scale.channel)
                .ok_or(RenderError::NonNumericChannel(scale.channel))?;
            render_circular_scale(value, scale, center, spec.radius(), palette)
        }
        GaugeKind::AttitudeSphere(attitude) => render_attitude_sphere(
            input.sample.roll_rad,
            input.sample.pitch_rad,
            attitude,
            center,
            spec.radius() * 2.0,
            palette,
        ),
        GaugeKind::HeadingCompass(compass) => {
            render_heading_compass(input.sample.heading_deg(), compass, center, spec.radius(), palette)
        }
        GaugeKind::StatusStrip(strip) => {
            render_status_strip(input.faults.flags(), strip, spec.position, spec.size, palette)
        }
        GaugeKind::TextBox(text_box) => {
            let text = match text_box.channel {
                Channel::Clock => input.clock.format("%H:%M:%S").to_string(),
                channel => {
                    let value = input
                        .value(channel)
                        .ok_or(RenderError::NonNumericChannel(channel))?;
                    text_box.display(value)
                }
            };
            render_text_box(&text, text_box, spec.position, spec.size, palette)
        }
    }
}

/// Composes frames from a fixed layout.
pub struct PanelRenderer {
    layout: PanelLayout,
    /// Gauges whose failure has already been logged
    reported: HashSet<String>,
}

impl PanelRenderer {
    /// Renderer for a validated layout
    pub fn new(layout: PanelLayout) -> Self {
        info!("Panel renderer ready with {} gauges", layout.gauges.len());
        Self {
            layout,
            reported: HashSet::new(),
        }
    }

    /// The layout being rendered
    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    /// Gauge ids currently failing to render
    pub fn failing_gauges(&self) -> impl Iterator<Item = &str> {
        self.reported.iter().map(String::as_str)
    }

    /// Draw one frame; a failing gauge is skipped and logged once
    pub fn render(&mut self, input: &PanelInput) -> Frame {
        let palette = &self.layout.palette;
        let mut frame = Frame::new(self.layout.width, self.layout.height, palette.background);

        for gauge in &self.layout.gauges {
            match render_gauge(gauge, input, palette) {
                Ok(commands) => {
                    frame.extend(commands);
                    if self.reported.remove(&gauge.id) {
                        info!("Gauge '{}' renders again", gauge.id);
                    }
                }
                Err(e) => {
                    if self.reported.insert(gauge.id.clone()) {
                        warn!("Skipping {} gauge '{}': {}", gauge.kind.name(), gauge.id, e);
                    }
                }
            }
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> PanelInput {
        PanelInput::new(
            &TelemetrySnapshot {
                pull_connected: true,
                ..Default::default()
            },
            NaiveTime::from_hms_opt(12, 34, 56).unwrap(),
        )
    }

    #[test]
    fn test_default_layout_gauge_ids() {
        let layout = PanelLayout::default();
        let ids: Vec<_> = layout.gauges.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids.len(), 12);
        assert!(layout.gauge("attitude").is_some());
        assert!(layout.gauges.iter().all(|g| g.validate().is_ok()));
    }

    #[test]
    fn test_clock_box_uses_wall_time() {
        let mut renderer = PanelRenderer::new(PanelLayout::default());
        let frame = renderer.render(&input());
        assert!(frame.texts().contains(&"12:34:56"));
    }

    #[test]
    fn test_clock_bound_scale_is_skipped_once() {
        let mut layout = PanelLayout::default();
        if let Some(GaugeKind::CircularScale(scale)) = layout.gauges.iter_mut().find(|g| g.id == "speed").map(|g| &mut g.kind) {
            scale.channel = Channel::Clock;
        }
        let mut renderer = PanelRenderer::new(layout);
        renderer.render(&input());
        renderer.render(&input());
        let failing: Vec<_> = renderer.failing_gauges().collect();
        assert_eq!(failing, vec!["speed"]);
    }
}
