//! Telnet property interface
//!
//! After `data\r\n` the simulator answers each `get <path>` with one bare
//! value line. `set <path> <value>` has no reply.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info};

use super::TelemetryError;

/// An open property session.
pub struct TelnetConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: SocketAddr,
    line: String,
}

impl TelnetConnection {
    /// Connect and switch the session to raw data mode.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, TelemetryError> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| TelemetryError::ConnectionFailed(format!("{host}:{port}: connect timed out")))?
            .map_err(|e| TelemetryError::ConnectionFailed(format!("{host}:{port}: {e}")))?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;

        let (read_half, write_half) = stream.into_split();
        let mut conn = Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            peer,
            line: String::new(),
        };
        conn.send("data").await?;
        info!("Telnet session open to {}", peer);
        Ok(conn)
    }

    /// Remote address of the session
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Read one property as a raw string.
    pub async fn get(&mut self, path: &str) -> Result<String, TelemetryError> {
        self.send(&format!("get {path}")).await?;
        self.line.clear();
        let n = self.reader.read_line(&mut self.line).await?;
        if n == 0 {
            return Err(TelemetryError::ConnectionClosed);
        }
        let value = self.line.trim_end_matches(['\r', '\n']).to_string();
        debug!("get {} -> {}", path, value);
        Ok(value)
    }

    /// Read one property as a number.
    pub async fn get_f64(&mut self, path: &str) -> Result<f64, TelemetryError> {
        let raw = self.get(path).await?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| TelemetryError::InvalidValue {
                path: path.to_string(),
                value: raw,
            })
    }

    /// Write one property.
    pub async fn set(&mut self, path: &str, value: &str) -> Result<(), TelemetryError> {
        self.send(&format!("set {path} {value}")).await
    }

    async fn send(&mut self, command: &str) -> Result<(), TelemetryError> {
        self.writer.write_all(command.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}
