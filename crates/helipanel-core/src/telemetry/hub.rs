//! Per-tick telemetry aggregation
//!
//! Each refresh drains the push feed, then pulls airspeed and the bound
//! engine properties over telnet within one shared timeout. A property that
//! answers with something other than a number is skipped on its own. A
//! failed or timed-out pull keeps the last good values, drops the session
//! (its reply stream may be out of step) and reconnects later, at most once
//! per reconnect interval. Reconnects run on a background task so a silent
//! simulator host never holds up a frame.

use std::collections::HashSet;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{EngineReadings, EngineReadout, GuiFeed, TelemetryError, TelemetrySample, TelnetConnection};
use crate::config::TelemetrySettings;

/// Everything the panel needs from one telemetry refresh.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySnapshot {
    /// Latest flight state
    pub sample: TelemetrySample,
    /// Latest engine readings
    pub engine: EngineReadings,
    /// No push datagram within the staleness window
    pub feed_stale: bool,
    /// The telnet session is currently open
    pub pull_connected: bool,
}

impl TelemetrySnapshot {
    /// Either telemetry path is down
    pub fn link_lost(&self) -> bool {
        self.feed_stale || !self.pull_connected
    }
}

/// Anything that can produce a snapshot per tick.
#[allow(async_fn_in_trait)]
pub trait TelemetrySource {
    /// Gather the state for the current tick.
    async fn refresh(&mut self) -> TelemetrySnapshot;
}

type ConnectTask = JoinHandle<Result<TelnetConnection, TelemetryError>>;

#[derive(Default)]
struct PulledValues {
    airspeed_kt: Option<f64>,
    engine: Vec<(EngineReadout, f64)>,
    /// `(path, raw reply)` of properties that did not parse as numbers
    invalid: Vec<(String, String)>,
}

impl PulledValues {
    /// Keep a number, set aside a non-numeric reply, pass anything else up.
    fn accept(&mut self, result: Result<f64, TelemetryError>) -> Result<Option<f64>, TelemetryError> {
        match result {
            Ok(value) => Ok(Some(value)),
            // the reply line was consumed, so the session is still in step
            Err(TelemetryError::InvalidValue { path, value }) => {
                self.invalid.push((path, value));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Live simulator connection: GUI feed plus telnet session.
pub struct TelemetryHub {
    settings: TelemetrySettings,
    feed: GuiFeed,
    telnet: Option<TelnetConnection>,
    connecting: Option<ConnectTask>,
    sample: TelemetrySample,
    engine: EngineReadings,
    pulled_airspeed: Option<f64>,
    last_packet_at: Option<Instant>,
    last_connect_attempt: Option<Instant>,
    /// Properties already reported as non-numeric
    invalid_reported: HashSet<String>,
}

impl TelemetryHub {
    /// Bind the feed and open the telnet session.
    ///
    /// Both are required at startup; later telnet failures are recovered.
    pub async fn connect(
        settings: TelemetrySettings,
        engine_defaults: EngineReadings,
    ) -> Result<Self, TelemetryError> {
        let feed = GuiFeed::bind((settings.gui_bind_address.as_str(), settings.gui_port)).await?;
        tracing::info!("GUI feed listening on {}", feed.local_addr()?);

        let telnet = TelnetConnection::connect(
            &settings.host,
            settings.telnet_port,
            settings.connect_timeout(),
        )
        .await?;

        Ok(Self {
            settings,
            feed,
            telnet: Some(telnet),
            connecting: None,
            sample: TelemetrySample::default(),
            engine: engine_defaults,
            pulled_airspeed: None,
            last_packet_at: None,
            last_connect_attempt: Some(Instant::now()),
            invalid_reported: HashSet::new(),
        })
    }

    /// Address the GUI feed is bound to
    pub fn feed_addr(&self) -> Result<std::net::SocketAddr, TelemetryError> {
        self.feed.local_addr()
    }

    /// Whether the telnet session is open right now
    pub fn is_pull_connected(&self) -> bool {
        self.telnet.is_some()
    }

    /// A background reconnect is in flight
    pub fn is_reconnecting(&self) -> bool {
        self.connecting.is_some()
    }

    fn poll_feed(&mut self) {
        match self.feed.poll_latest() {
            Ok(Some(packet)) => {
                self.sample = packet.to_sample();
                self.last_packet_at = Some(Instant::now());
            }
            Ok(None) => {}
            Err(e) => warn!("GUI feed receive failed: {}", e),
        }
        if let Some(airspeed) = self.pulled_airspeed {
            self.sample.airspeed_kt = airspeed;
        }
    }

    fn feed_stale(&self) -> bool {
        match self.last_packet_at {
            Some(at) => at.elapsed() >= self.settings.stale_after(),
            None => true,
        }
    }

    /// Collect a finished reconnect, or start one when due. Never waits on
    /// the network.
    async fn poll_reconnect(&mut self) {
        if self.telnet.is_some() {
            return;
        }

        if let Some(task) = self.connecting.take() {
            if !task.is_finished() {
                self.connecting = Some(task);
                return;
            }
            // finished, so this resolves on the first poll
            match task.await {
                Ok(Ok(conn)) => self.telnet = Some(conn),
                Ok(Err(e)) => debug!("Telnet reconnect failed: {}", e),
                Err(e) => warn!("Telnet reconnect task ended abnormally: {}", e),
            }
            return;
        }

        let due = self
            .last_connect_attempt
            .map_or(true, |at| at.elapsed() >= self.settings.reconnect_interval());
        if !due {
            return;
        }
        self.last_connect_attempt = Some(Instant::now());

        let host = self.settings.host.clone();
        let port = self.settings.telnet_port;
        let timeout = self.settings.connect_timeout();
        self.connecting = Some(tokio::spawn(async move {
            TelnetConnection::connect(&host, port, timeout).await
        }));
    }

    async fn pull_values(
        conn: &mut TelnetConnection,
        settings: &TelemetrySettings,
    ) -> Result<PulledValues, TelemetryError> {
        let mut values = PulledValues {
            engine: Vec::with_capacity(settings.engine_bindings.len()),
            ..Default::default()
        };
        values.airspeed_kt = values.accept(conn.get_f64(&settings.airspeed_property).await)?;
        for binding in &settings.engine_bindings {
            if let Some(raw) = values.accept(conn.get_f64(&binding.property).await)? {
                values.engine.push((binding.readout, binding.apply(raw)));
            }
        }
        Ok(values)
    }

    async fn pull(&mut self) {
        self.poll_reconnect().await;
        let Some(conn) = self.telnet.as_mut() else {
            return;
        };

        let timeout = self.settings.request_timeout();
        let result = tokio::time::timeout(timeout, Self::pull_values(conn, &self.settings))
            .await
            .map_err(TelemetryError::from)
            .and_then(|r| r);

        match result {
            Ok(values) => {
                if let Some(airspeed) = values.airspeed_kt {
                    self.pulled_airspeed = Some(airspeed);
                    self.sample.airspeed_kt = airspeed;
                }
                for (readout, value) in values.engine {
                    self.engine.set(readout, value);
                }
                for (path, value) in values.invalid {
                    if self.invalid_reported.insert(path.clone()) {
                        warn!("Ignoring non-numeric value '{}' for {}", value, path);
                    }
                }
            }
            Err(e) => {
                warn!("Telnet pull failed, dropping session: {}", e);
                self.telnet = None;
                self.last_connect_attempt = Some(Instant::now());
            }
        }
    }

    /// Produce the snapshot for this tick.
    pub async fn refresh(&mut self) -> TelemetrySnapshot {
        self.poll_feed();
        self.pull().await;
        TelemetrySnapshot {
            sample: self.sample,
            engine: self.engine,
            feed_stale: self.feed_stale(),
            pull_connected: self.telnet.is_some(),
        }
    }
}

impl Drop for TelemetryHub {
    fn drop(&mut self) {
        if let Some(task) = self.connecting.take() {
            task.abort();
        }
    }
}

impl TelemetrySource for TelemetryHub {
    async fn refresh(&mut self) -> TelemetrySnapshot {
        TelemetryHub::refresh(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_lost_when_either_side_down() {
        let ok = TelemetrySnapshot {
            feed_stale: false,
            pull_connected: true,
            ..Default::default()
        };
        assert!(!ok.link_lost());
        assert!(TelemetrySnapshot { feed_stale: true, ..ok }.link_lost());
        assert!(TelemetrySnapshot { pull_connected: false, ..ok }.link_lost());
    }

    #[test]
    fn test_non_numeric_reply_is_set_aside() {
        let mut values = PulledValues::default();
        let bad = Err(TelemetryError::InvalidValue {
            path: "/engines/engine/rpm".to_string(),
            value: "n/a".to_string(),
        });
        assert_eq!(values.accept(bad).unwrap(), None);
        assert_eq!(values.accept(Ok(150.0)).unwrap(), Some(150.0));
        assert_eq!(values.invalid, vec![("/engines/engine/rpm".to_string(), "n/a".to_string())]);
    }

    #[test]
    fn test_io_failure_is_passed_up() {
        let mut values = PulledValues::default();
        assert!(matches!(
            values.accept(Err(TelemetryError::ConnectionClosed)),
            Err(TelemetryError::ConnectionClosed)
        ));
        assert!(values.invalid.is_empty());
    }
}
