//! # HeliPanel application
//!
//! The render loop: refresh telemetry, render, present, wait for the next
//! tick. Runs on a single task until cancelled, the host asks to quit or a
//! tick limit is reached.

pub mod host;

pub use host::{PresentationHost, SvgSnapshotHost};

use anyhow::Result;
use chrono::Local;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use helipanel_core::panel::{PanelInput, PanelRenderer};
use helipanel_core::telemetry::TelemetrySource;
use helipanel_core::trajectory::TrajectoryRecorder;

/// Loop parameters
#[derive(Debug, Clone, Copy)]
pub struct LoopOptions {
    pub tick_interval: Duration,
    /// Stop after this many frames
    pub max_ticks: Option<u64>,
}

/// What the loop did, for the shutdown log line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    /// Frames rendered while the link-loss flag was active
    pub link_loss_frames: u64,
}

/// Drive the panel until cancellation.
pub async fn run_panel<S, H>(
    source: &mut S,
    renderer: &mut PanelRenderer,
    host: &mut H,
    mut recorder: Option<&mut TrajectoryRecorder>,
    options: LoopOptions,
    cancel: CancellationToken,
) -> Result<LoopStats>
where
    S: TelemetrySource,
    H: PresentationHost,
{
    let mut ticker = tokio::time::interval(options.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let started = Instant::now();
    let mut stats = LoopStats::default();
    let mut link_lost = false;
    let mut last_frame = None;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let snapshot = source.refresh().await;
        if snapshot.link_lost() != link_lost {
            link_lost = snapshot.link_lost();
            if link_lost {
                warn!(
                    "Telemetry link lost (feed stale: {}, telnet connected: {})",
                    snapshot.feed_stale, snapshot.pull_connected
                );
            } else {
                info!("Telemetry link restored");
            }
        }

        // a stale feed only carries the last or default position
        if let Some(rec) = recorder.as_deref_mut().filter(|_| !snapshot.feed_stale) {
            rec.record(&snapshot.sample, started.elapsed());
        }

        let input = PanelInput::new(&snapshot, Local::now().time());
        let frame = renderer.render(&input);
        host.present(&frame)?;
        last_frame = Some(frame);

        stats.frames += 1;
        if link_lost {
            stats.link_loss_frames += 1;
        }

        if host.quit_requested() {
            info!("Presentation host requested quit");
            break;
        }
        if options.max_ticks.is_some_and(|max| stats.frames >= max) {
            break;
        }
    }

    host.finish(last_frame.as_ref())?;
    Ok(stats)
}
