//! Flight telemetry model and simulator clients
//!
//! The simulator is reached two ways: a push feed of fixed-layout UDP
//! datagrams ([`GuiFeed`]) and a line-oriented telnet property interface
//! ([`TelnetConnection`]). [`TelemetryHub`] combines both into one
//! [`TelemetrySnapshot`] per tick.

/// Telemetry error type
pub mod error;
mod gui;
mod hub;
mod telnet;

pub use error::TelemetryError;
pub use gui::{GuiFeed, GuiPacket, GUI_PACKET_LEN, GUI_PROTOCOL_VERSION};
pub use hub::{TelemetryHub, TelemetrySnapshot, TelemetrySource};
pub use telnet::TelnetConnection;

use serde::{Deserialize, Serialize};

use crate::unit_conversion::normalize_degrees;

/// One flat record of flight state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Latitude, degrees
    pub latitude_deg: f64,
    /// Longitude, degrees
    pub longitude_deg: f64,
    /// Altitude above sea level, m
    pub altitude_m: f64,
    /// Height above ground, m
    pub height_above_ground_m: f64,
    /// Roll, radians (positive right wing down)
    pub roll_rad: f64,
    /// Pitch, radians (positive nose up)
    pub pitch_rad: f64,
    /// True heading, radians
    pub yaw_rad: f64,
    /// Vertical speed, m/s (positive up)
    pub climb_rate_mps: f64,
    /// Indicated airspeed, knots
    pub airspeed_kt: f64,
}

impl TelemetrySample {
    /// Roll in degrees
    pub fn roll_deg(&self) -> f64 {
        self.roll_rad.to_degrees()
    }

    /// Pitch in degrees
    pub fn pitch_deg(&self) -> f64 {
        self.pitch_rad.to_degrees()
    }

    /// Heading in `[0, 360)`
    pub fn heading_deg(&self) -> f64 {
        normalize_degrees(self.yaw_rad.to_degrees())
    }
}

/// Identity of a fault indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCode {
    /// Telemetry feed stale or telnet session down
    LinkLoss,
    /// Battery or fuel charge low
    LowCharge,
    /// Engine failure
    EngineFault,
    /// Sensor failure
    SensorFault,
    /// Attitude reference lost
    AttitudeLoss,
    /// Stabilization system failure
    StabilizationFault,
    /// Temperature limit exceeded
    Overheat,
    /// Vibration limit exceeded
    HighVibration,
    /// No GPS fix
    NoGps,
    /// Altitude reference failure
    AltitudeFault,
}

impl FaultCode {
    /// Display order on the status strip
    pub const ALL: [FaultCode; 10] = [
        FaultCode::LinkLoss,
        FaultCode::LowCharge,
        FaultCode::EngineFault,
        FaultCode::SensorFault,
        FaultCode::AttitudeLoss,
        FaultCode::StabilizationFault,
        FaultCode::Overheat,
        FaultCode::HighVibration,
        FaultCode::NoGps,
        FaultCode::AltitudeFault,
    ];

    /// Three-letter code shown in the strip slot
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::LinkLoss => "LNK",
            Self::LowCharge => "BAT",
            Self::EngineFault => "ENG",
            Self::SensorFault => "SNS",
            Self::AttitudeLoss => "ATT",
            Self::StabilizationFault => "STB",
            Self::Overheat => "OVH",
            Self::HighVibration => "VIB",
            Self::NoGps => "GPS",
            Self::AltitudeFault => "ALT",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::LinkLoss => "Link loss",
            Self::LowCharge => "Low charge",
            Self::EngineFault => "Engine fault",
            Self::SensorFault => "Sensor fault",
            Self::AttitudeLoss => "Attitude loss",
            Self::StabilizationFault => "Stabilization fault",
            Self::Overheat => "Overheat",
            Self::HighVibration => "High vibration",
            Self::NoGps => "No GPS signal",
            Self::AltitudeFault => "Altitude fault",
        }
    }
}

/// One fault indicator as shown on the status strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultFlag {
    /// Which fault
    pub code: FaultCode,
    /// Human-readable name
    pub label: String,
    /// Strip slot text
    pub abbreviation: String,
    /// Fault is currently raised
    pub is_active: bool,
}

impl From<FaultCode> for FaultFlag {
    fn from(code: FaultCode) -> Self {
        Self {
            code,
            label: code.label().to_string(),
            abbreviation: code.abbreviation().to_string(),
            is_active: false,
        }
    }
}

/// Ordered fault list, replaced wholesale every tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultSet {
    flags: Vec<FaultFlag>,
}

impl Default for FaultSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl FaultSet {
    /// The ten standard indicators, all inactive
    pub fn standard() -> Self {
        Self {
            flags: FaultCode::ALL.into_iter().map(FaultFlag::from).collect(),
        }
    }

    /// Fault set for the current telemetry state.
    ///
    /// Only link loss has a real source; the remaining diagnostics are not
    /// wired to the simulator and stay inactive.
    pub fn evaluate(snapshot: &TelemetrySnapshot) -> Self {
        let mut set = Self::standard();
        set.set(FaultCode::LinkLoss, snapshot.link_lost());
        set
    }

    /// Flags in strip order
    pub fn flags(&self) -> &[FaultFlag] {
        &self.flags
    }

    /// Raise or clear one fault
    pub fn set(&mut self, code: FaultCode, active: bool) {
        if let Some(flag) = self.flags.iter_mut().find(|f| f.code == code) {
            flag.is_active = active;
        }
    }

    /// Whether `code` is raised
    pub fn is_active(&self, code: FaultCode) -> bool {
        self.flags.iter().any(|f| f.code == code && f.is_active)
    }

    /// Number of raised faults
    pub fn active_count(&self) -> usize {
        self.flags.iter().filter(|f| f.is_active).count()
    }
}

/// Engine-side readout that can be bound to a simulator property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineReadout {
    /// Fuel remaining, percent
    FuelPercent,
    /// Engine speed, rpm
    Rpm,
    /// Outside air temperature, °C
    OutsideAirTemp,
    /// Engine temperature, °C
    EngineTemp,
    /// Oil quantity, liters
    OilQuantity,
}

/// Engine and environment readings for the text boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineReadings {
    /// Fuel remaining, percent
    pub fuel_percent: f64,
    /// Engine speed, rpm
    pub rpm: f64,
    /// Outside air temperature, °C
    pub outside_air_temp_c: f64,
    /// Engine temperature, °C
    pub engine_temp_c: f64,
    /// Oil quantity, liters
    pub oil_liters: f64,
}

impl Default for EngineReadings {
    fn default() -> Self {
        Self {
            fuel_percent: 73.0,
            rpm: 2000.0,
            outside_air_temp_c: 19.0,
            engine_temp_c: 690.0,
            oil_liters: 9.0,
        }
    }
}

impl EngineReadings {
    /// Current value of one readout
    pub fn get(&self, readout: EngineReadout) -> f64 {
        match readout {
            EngineReadout::FuelPercent => self.fuel_percent,
            EngineReadout::Rpm => self.rpm,
            EngineReadout::OutsideAirTemp => self.outside_air_temp_c,
            EngineReadout::EngineTemp => self.engine_temp_c,
            EngineReadout::OilQuantity => self.oil_liters,
        }
    }

    /// Overwrite one readout
    pub fn set(&mut self, readout: EngineReadout, value: f64) {
        let slot = match readout {
            EngineReadout::FuelPercent => &mut self.fuel_percent,
            EngineReadout::Rpm => &mut self.rpm,
            EngineReadout::OutsideAirTemp => &mut self.outside_air_temp_c,
            EngineReadout::EngineTemp => &mut self.engine_temp_c,
            EngineReadout::OilQuantity => &mut self.oil_liters,
        };
        *slot = value;
    }
}
