//! # HeliPanel Core Library
//!
//! Core functionality for the HeliPanel helicopter instrument panel.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Flight telemetry model and simulator clients (GUI feed, telnet)
//! - Gauge geometry: circular scales, attitude sphere, compass, status
//!   strip, text readouts
//! - Panel composition into display-list frames and SVG output
//! - JSON panel configuration
//! - Demo flight simulator and trajectory export
//!
//! ## Example
//!
//! ```rust,ignore
//! use helipanel_core::prelude::*;
//!
//! let config = PanelConfig::load_or_default(None)?;
//! let mut hub = TelemetryHub::connect(config.telemetry.clone(), config.engine_defaults).await?;
//! let mut renderer = PanelRenderer::new(config.layout.clone());
//!
//! let snapshot = hub.refresh().await;
//! let frame = renderer.render(&PanelInput::new(&snapshot, chrono::Local::now().time()));
//! write_svg_file(&frame, std::path::Path::new("panel.svg"))?;
//! ```

pub mod config;
pub mod demo;
pub mod gauge;
pub mod panel;
pub mod render;
pub mod telemetry;
pub mod trajectory;
pub mod unit_conversion;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ConfigError, EngineBinding, PanelConfig, TelemetrySettings};
    pub use crate::demo::DemoSimulator;
    pub use crate::gauge::{Channel, GaugeKind, GaugeSpec, RenderError};
    pub use crate::panel::{PanelInput, PanelLayout, PanelRenderer};
    pub use crate::render::{write_svg, write_svg_file, DrawCommand, Frame, Palette, Point, Size};
    pub use crate::telemetry::{
        EngineReadings, FaultCode, FaultSet, TelemetryError, TelemetryHub, TelemetrySample,
        TelemetrySnapshot, TelemetrySource,
    };
    pub use crate::trajectory::{TrajectoryError, TrajectoryRecorder};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
