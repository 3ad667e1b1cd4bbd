//! GUI push feed
//!
//! The simulator's `--native-gui` output: one fixed-size datagram per
//! simulator frame, network byte order.
//!
//! Datagram layout (version 8, 108 bytes):
//! - u32 version, u32 padding
//! - f64 longitude, f64 latitude (radians)
//! - f32 altitude, f32 height above ground (m)
//! - f32 roll, pitch, yaw (radians)
//! - f32 calibrated airspeed (kt), f32 climb rate (ft/s)
//! - u32 tank count, 4 x f32 fuel quantity
//! - u32 sim time, u32 time warp, f32 ground elevation
//! - f32 tuned frequency, f32 nav radial, u32 in range
//! - f32 distance (nm), f32 course deviation, f32 glideslope deviation

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor};
use tokio::net::{ToSocketAddrs, UdpSocket};
use tracing::{debug, warn};

use super::{TelemetryError, TelemetrySample};
use crate::unit_conversion::feet_per_sec_to_meters_per_sec;

/// Supported packet version
pub const GUI_PROTOCOL_VERSION: u32 = 8;

/// Size of one datagram in bytes
pub const GUI_PACKET_LEN: usize = 108;

const RECV_BUFFER_LEN: usize = 1024;

/// One decoded GUI datagram.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GuiPacket {
    /// Protocol version
    pub version: u32,
    /// Longitude, radians
    pub longitude_rad: f64,
    /// Latitude, radians
    pub latitude_rad: f64,
    /// Altitude above sea level, m
    pub altitude_m: f32,
    /// Height above ground, m
    pub agl_m: f32,
    /// Roll, radians
    pub phi_rad: f32,
    /// Pitch, radians
    pub theta_rad: f32,
    /// True heading, radians
    pub psi_rad: f32,
    /// Calibrated airspeed, knots
    pub vcas_kt: f32,
    /// Climb rate, ft/s
    pub climb_rate_ft_per_s: f32,
    /// Number of fuel tanks reported
    pub num_tanks: u32,
    /// Quantity per tank
    pub fuel_quantity: [f32; 4],
    /// Simulator time, seconds
    pub cur_time: u32,
    /// Time warp offset, seconds
    pub warp: u32,
    /// Ground elevation, m
    pub ground_elev_m: f32,
    /// Tuned nav frequency
    pub tuned_freq: f32,
    /// Selected nav radial
    pub nav_radial: f32,
    /// Nav station in range
    pub in_range: u32,
    /// Distance to the nav station, nm
    pub dist_nm: f32,
    /// Course deviation, degrees
    pub course_deviation_deg: f32,
    /// Glideslope deviation, degrees
    pub gs_deviation_deg: f32,
}

impl GuiPacket {
    /// Decode a datagram, checking length and version.
    pub fn decode(data: &[u8]) -> Result<Self, TelemetryError> {
        if data.len() != GUI_PACKET_LEN {
            return Err(TelemetryError::InvalidLength {
                expected: GUI_PACKET_LEN,
                actual: data.len(),
            });
        }

        let mut rdr = Cursor::new(data);
        let version = rdr.read_u32::<BigEndian>()?;
        if version != GUI_PROTOCOL_VERSION {
            return Err(TelemetryError::VersionMismatch {
                expected: GUI_PROTOCOL_VERSION,
                actual: version,
            });
        }
        let _pad = rdr.read_u32::<BigEndian>()?;

        let mut packet = Self {
            version,
            longitude_rad: rdr.read_f64::<BigEndian>()?,
            latitude_rad: rdr.read_f64::<BigEndian>()?,
            altitude_m: rdr.read_f32::<BigEndian>()?,
            agl_m: rdr.read_f32::<BigEndian>()?,
            phi_rad: rdr.read_f32::<BigEndian>()?,
            theta_rad: rdr.read_f32::<BigEndian>()?,
            psi_rad: rdr.read_f32::<BigEndian>()?,
            vcas_kt: rdr.read_f32::<BigEndian>()?,
            climb_rate_ft_per_s: rdr.read_f32::<BigEndian>()?,
            num_tanks: rdr.read_u32::<BigEndian>()?,
            ..Self::default()
        };
        rdr.read_f32_into::<BigEndian>(&mut packet.fuel_quantity)?;
        packet.cur_time = rdr.read_u32::<BigEndian>()?;
        packet.warp = rdr.read_u32::<BigEndian>()?;
        packet.ground_elev_m = rdr.read_f32::<BigEndian>()?;
        packet.tuned_freq = rdr.read_f32::<BigEndian>()?;
        packet.nav_radial = rdr.read_f32::<BigEndian>()?;
        packet.in_range = rdr.read_u32::<BigEndian>()?;
        packet.dist_nm = rdr.read_f32::<BigEndian>()?;
        packet.course_deviation_deg = rdr.read_f32::<BigEndian>()?;
        packet.gs_deviation_deg = rdr.read_f32::<BigEndian>()?;

        Ok(packet)
    }

    /// Encode to the wire layout. Used by tests and replay tools.
    pub fn encode(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(GUI_PACKET_LEN);
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    fn write_to(&self, buf: &mut Vec<u8>) -> io::Result<()> {
        buf.write_u32::<BigEndian>(self.version)?;
        buf.write_u32::<BigEndian>(0)?;
        buf.write_f64::<BigEndian>(self.longitude_rad)?;
        buf.write_f64::<BigEndian>(self.latitude_rad)?;
        for v in [
            self.altitude_m,
            self.agl_m,
            self.phi_rad,
            self.theta_rad,
            self.psi_rad,
            self.vcas_kt,
            self.climb_rate_ft_per_s,
        ] {
            buf.write_f32::<BigEndian>(v)?;
        }
        buf.write_u32::<BigEndian>(self.num_tanks)?;
        for v in self.fuel_quantity {
            buf.write_f32::<BigEndian>(v)?;
        }
        buf.write_u32::<BigEndian>(self.cur_time)?;
        buf.write_u32::<BigEndian>(self.warp)?;
        buf.write_f32::<BigEndian>(self.ground_elev_m)?;
        buf.write_f32::<BigEndian>(self.tuned_freq)?;
        buf.write_f32::<BigEndian>(self.nav_radial)?;
        buf.write_u32::<BigEndian>(self.in_range)?;
        buf.write_f32::<BigEndian>(self.dist_nm)?;
        buf.write_f32::<BigEndian>(self.course_deviation_deg)?;
        buf.write_f32::<BigEndian>(self.gs_deviation_deg)?;
        Ok(())
    }

    /// Convert to panel units. Airspeed is the feed's calibrated airspeed;
    /// the hub replaces it with the telnet value when one is available.
    pub fn to_sample(&self) -> TelemetrySample {
        TelemetrySample {
            latitude_deg: self.latitude_rad.to_degrees(),
            longitude_deg: self.longitude_rad.to_degrees(),
            altitude_m: self.altitude_m as f64,
            height_above_ground_m: self.agl_m as f64,
            roll_rad: self.phi_rad as f64,
            pitch_rad: self.theta_rad as f64,
            yaw_rad: self.psi_rad as f64,
            climb_rate_mps: feet_per_sec_to_meters_per_sec(self.climb_rate_ft_per_s as f64),
            airspeed_kt: self.vcas_kt as f64,
        }
    }
}

/// Non-blocking receiver for the GUI feed.
pub struct GuiFeed {
    socket: UdpSocket,
    buf: Vec<u8>,
    received: u64,
    rejected: u64,
}

impl GuiFeed {
    /// Bind the local UDP port the simulator sends to.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, TelemetryError> {
        let socket = UdpSocket::bind(addr).await.map_err(|e| {
            TelemetryError::ConnectionFailed(format!("cannot bind GUI feed socket: {e}"))
        })?;
        Ok(Self {
            socket,
            buf: vec![0u8; RECV_BUFFER_LEN],
            received: 0,
            rejected: 0,
        })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, TelemetryError> {
        Ok(self.socket.local_addr()?)
    }

    /// Drain every queued datagram and return the newest valid one.
    ///
    /// Never waits. Malformed datagrams are logged and skipped.
    pub fn poll_latest(&mut self) -> Result<Option<GuiPacket>, TelemetryError> {
        let mut latest = None;
        loop {
            match self.socket.try_recv_from(&mut self.buf) {
                Ok((len, from)) => match GuiPacket::decode(&self.buf[..len]) {
                    Ok(packet) => {
                        self.received += 1;
                        latest = Some(packet);
                    }
                    Err(e) => {
                        self.rejected += 1;
                        warn!("Dropping GUI datagram from {}: {}", from, e);
                    }
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e.into()),
            }
        }
        if latest.is_some() {
            debug!("GUI feed: {} packets received, {} rejected", self.received, self.rejected);
        }
        Ok(latest)
    }

    /// Wait for the next valid datagram.
    pub async fn recv(&mut self) -> Result<GuiPacket, TelemetryError> {
        loop {
            let (len, from) = self.socket.recv_from(&mut self.buf).await?;
            match GuiPacket::decode(&self.buf[..len]) {
                Ok(packet) => {
                    self.received += 1;
                    return Ok(packet);
                }
                Err(e) => {
                    self.rejected += 1;
                    warn!("Dropping GUI datagram from {}: {}", from, e);
                }
            }
        }
    }

    /// Number of datagrams rejected so far
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_packet() -> GuiPacket {
        GuiPacket {
            version: GUI_PROTOCOL_VERSION,
            longitude_rad: 39.701148f64.to_radians(),
            latitude_rad: 54.524580f64.to_radians(),
            altitude_m: 350.0,
            agl_m: 200.0,
            phi_rad: 0.1,
            theta_rad: -0.05,
            psi_rad: 1.5,
            vcas_kt: 120.0,
            climb_rate_ft_per_s: 10.0,
            num_tanks: 2,
            fuel_quantity: [10.0, 12.0, 0.0, 0.0],
            ..Default::default()
        }
    }

    #[test]
    fn test_encoded_length() {
        assert_eq!(sample_packet().encode().unwrap().len(), GUI_PACKET_LEN);
    }

    #[test]
    fn test_decode_field_offsets() {
        let bytes = sample_packet().encode().unwrap();
        // version is the first big-endian word
        assert_eq!(&bytes[0..4], &[0, 0, 0, 8]);
        // num_tanks sits after 2 words, 2 doubles and 7 floats
        assert_eq!(&bytes[52..56], &[0, 0, 0, 2]);
        let decoded = GuiPacket::decode(&bytes).unwrap();
        assert_eq!(decoded.fuel_quantity[1], 12.0);
    }

    #[test]
    fn test_rejects_short_datagram() {
        let bytes = sample_packet().encode().unwrap();
        assert!(matches!(
            GuiPacket::decode(&bytes[..100]),
            Err(TelemetryError::InvalidLength { expected: 108, actual: 100 })
        ));
    }

    #[test]
    fn test_rejects_other_version() {
        let mut packet = sample_packet();
        packet.version = 7;
        assert!(matches!(
            GuiPacket::decode(&packet.encode().unwrap()),
            Err(TelemetryError::VersionMismatch { expected: 8, actual: 7 })
        ));
    }

    #[test]
    fn test_sample_units() {
        let sample = sample_packet().to_sample();
        assert!((sample.latitude_deg - 54.524580).abs() < 1e-9);
        assert!((sample.climb_rate_mps - 3.048).abs() < 1e-6);
        assert_eq!(sample.airspeed_kt, 120.0);
    }
}
