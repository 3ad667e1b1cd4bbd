//! Simulator clients against local mock endpoints

use std::collections::HashMap;
use std::time::Duration;

use helipanel_core::config::{EngineBinding, TelemetrySettings};
use helipanel_core::telemetry::{
    EngineReadings, EngineReadout, GuiFeed, GuiPacket, TelemetryError, TelemetryHub, TelnetConnection,
    GUI_PROTOCOL_VERSION,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::mpsc;

/// Serve `get` requests from a fixed property table, one session per
/// entry in `sessions`. A session with `close_after` set hangs up after
/// that many requests. Every received line is forwarded to `seen`.
async fn property_server(
    listener: TcpListener,
    props: HashMap<String, String>,
    sessions: Vec<Option<usize>>,
    seen: mpsc::UnboundedSender<String>,
) {
    for close_after in sessions {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();
        let mut served = 0;
        while let Ok(Some(line)) = lines.next_line().await {
            let _ = seen.send(line.clone());
            if let Some(path) = line.strip_prefix("get ") {
                if close_after.is_some_and(|n| served >= n) {
                    break;
                }
                let value = props.get(path).cloned().unwrap_or_default();
                if write_half.write_all(format!("{value}\r\n").as_bytes()).await.is_err() {
                    break;
                }
                served += 1;
            }
        }
    }
}

async fn start_server(
    props: &[(&str, &str)],
    sessions: Vec<Option<usize>>,
) -> (u16, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let props = props.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(property_server(listener, props, sessions, tx));
    (port, rx)
}

fn settings(telnet_port: u16) -> TelemetrySettings {
    TelemetrySettings {
        host: "127.0.0.1".to_string(),
        gui_bind_address: "127.0.0.1".to_string(),
        gui_port: 0,
        telnet_port,
        request_timeout_ms: 1000,
        stale_after_ms: 200,
        reconnect_interval_ms: 0,
        engine_bindings: vec![EngineBinding {
            readout: EngineReadout::Rpm,
            property: "/engines/engine/rpm".to_string(),
            scale: 1.0,
            offset: 0.0,
        }],
        ..Default::default()
    }
}

fn packet() -> GuiPacket {
    GuiPacket {
        version: GUI_PROTOCOL_VERSION,
        latitude_rad: 54.5f64.to_radians(),
        longitude_rad: 39.7f64.to_radians(),
        altitude_m: 420.0,
        vcas_kt: 60.0,
        climb_rate_ft_per_s: 10.0,
        ..Default::default()
    }
}

async fn send_packet(to: std::net::SocketAddr, bytes: &[u8]) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.send_to(bytes, to).await.unwrap();
}

#[tokio::test]
async fn test_gui_feed_receives_packet() {
    let mut feed = GuiFeed::bind("127.0.0.1:0").await.unwrap();
    let addr = feed.local_addr().unwrap();

    send_packet(addr, &[0u8; 12]).await;
    send_packet(addr, &packet().encode().unwrap()).await;

    let received = feed.recv().await.unwrap();
    assert_eq!(received, packet());
    assert_eq!(feed.rejected(), 1);
}

#[tokio::test]
async fn test_telnet_get_and_set() {
    let (port, mut seen) = start_server(&[("/position/altitude-ft", "1234.5")], vec![None]).await;
    let mut conn = TelnetConnection::connect("127.0.0.1", port, Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(conn.get("/position/altitude-ft").await.unwrap(), "1234.5");
    assert_eq!(conn.get_f64("/position/altitude-ft").await.unwrap(), 1234.5);
    conn.set("/controls/engines/engine/throttle", "0.8").await.unwrap();
    // a get after the set proves the set line was consumed
    conn.get("/position/altitude-ft").await.unwrap();

    assert_eq!(seen.recv().await.unwrap(), "data");
    assert_eq!(seen.recv().await.unwrap(), "get /position/altitude-ft");
    assert_eq!(seen.recv().await.unwrap(), "get /position/altitude-ft");
    assert_eq!(seen.recv().await.unwrap(), "set /controls/engines/engine/throttle 0.8");
}

#[tokio::test]
async fn test_telnet_non_numeric_value() {
    let (port, _seen) = start_server(&[("/sim/name", "ec130")], vec![None]).await;
    let mut conn = TelnetConnection::connect("127.0.0.1", port, Duration::from_secs(1))
        .await
        .unwrap();
    let err = conn.get_f64("/sim/name").await.unwrap_err();
    assert!(matches!(err, TelemetryError::InvalidValue { ref value, .. } if value == "ec130"));
}

#[tokio::test]
async fn test_telnet_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let result = TelnetConnection::connect("127.0.0.1", port, Duration::from_secs(1)).await;
    assert!(matches!(result, Err(TelemetryError::ConnectionFailed(_))));
}

#[tokio::test]
async fn test_hub_merges_feed_and_pull() {
    let props = [("/velocities/airspeed-kt", "87.5"), ("/engines/engine/rpm", "2210")];
    let (port, _seen) = start_server(&props, vec![None]).await;
    let mut hub = TelemetryHub::connect(settings(port), EngineReadings::default())
        .await
        .unwrap();

    // nothing received yet
    let first = hub.refresh().await;
    assert!(first.feed_stale);
    assert!(first.link_lost());

    send_packet(hub.feed_addr().unwrap(), &packet().encode().unwrap()).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let snap = hub.refresh().await;

    assert!(!snap.feed_stale);
    assert!(snap.pull_connected);
    assert!(!snap.link_lost());
    assert!((snap.sample.altitude_m - 420.0).abs() < 1e-9);
    assert!((snap.sample.climb_rate_mps - 3.048).abs() < 1e-6);
    // telnet airspeed wins over the feed's calibrated airspeed
    assert_eq!(snap.sample.airspeed_kt, 87.5);
    assert_eq!(snap.engine.rpm, 2210.0);
    // unbound readouts keep their defaults
    assert_eq!(snap.engine.fuel_percent, EngineReadings::default().fuel_percent);
}

#[tokio::test]
async fn test_hub_feed_goes_stale() {
    let props = [("/velocities/airspeed-kt", "80"), ("/engines/engine/rpm", "2000")];
    let (port, _seen) = start_server(&props, vec![None]).await;
    let mut hub = TelemetryHub::connect(settings(port), EngineReadings::default())
        .await
        .unwrap();

    send_packet(hub.feed_addr().unwrap(), &packet().encode().unwrap()).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!hub.refresh().await.feed_stale);

    tokio::time::sleep(Duration::from_millis(300)).await;
    let snap = hub.refresh().await;
    assert!(snap.feed_stale);
    // last good values are kept
    assert!((snap.sample.altitude_m - 420.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_hub_bad_binding_keeps_airspeed() {
    let props = [("/velocities/airspeed-kt", "150"), ("/engines/engine/rpm", "n/a")];
    let (port, _seen) = start_server(&props, vec![None]).await;
    let mut hub = TelemetryHub::connect(settings(port), EngineReadings::default())
        .await
        .unwrap();

    let snap = hub.refresh().await;
    assert!(snap.pull_connected);
    assert_eq!(snap.sample.airspeed_kt, 150.0);
    assert_eq!(snap.engine.rpm, EngineReadings::default().rpm);

    // the session stays in step across ticks
    let again = hub.refresh().await;
    assert!(again.pull_connected);
    assert_eq!(again.sample.airspeed_kt, 150.0);
}

#[tokio::test]
async fn test_hub_refresh_does_not_wait_for_reconnect() {
    let props = [("/velocities/airspeed-kt", "95"), ("/engines/engine/rpm", "2100")];
    let (port, _seen) = start_server(&props, vec![Some(0), None]).await;
    let mut hub = TelemetryHub::connect(settings(port), EngineReadings::default())
        .await
        .unwrap();

    assert!(!hub.refresh().await.pull_connected);

    // the reconnect is started in the background and the tick returns at once
    let started = std::time::Instant::now();
    let snap = hub.refresh().await;
    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(!snap.pull_connected);
    assert!(hub.is_reconnecting());
}

#[tokio::test]
async fn test_hub_reconnects_after_drop() {
    let props = [("/velocities/airspeed-kt", "95"), ("/engines/engine/rpm", "2100")];
    // first session hangs up on the first request, second one serves
    let (port, _seen) = start_server(&props, vec![Some(0), None]).await;
    let mut hub = TelemetryHub::connect(settings(port), EngineReadings::default())
        .await
        .unwrap();

    let dropped = hub.refresh().await;
    assert!(!dropped.pull_connected);
    assert!(dropped.link_lost());
    assert!(!hub.is_pull_connected());

    let mut restored = hub.refresh().await;
    for _ in 0..50 {
        if restored.pull_connected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        restored = hub.refresh().await;
    }
    assert!(restored.pull_connected);
    assert!(!hub.is_reconnecting());
    assert_eq!(restored.sample.airspeed_kt, 95.0);
    assert_eq!(restored.engine.rpm, 2100.0);
}
