use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use helipanel_app::{run_panel, LoopOptions, SvgSnapshotHost};
use helipanel_core::config::PanelConfig;
use helipanel_core::demo::DemoSimulator;
use helipanel_core::panel::{PanelInput, PanelRenderer};
use helipanel_core::render::write_svg_file;
use helipanel_core::telemetry::{TelemetryHub, TelemetrySnapshot};
use helipanel_core::trajectory::TrajectoryRecorder;

/// Helicopter instrument panel driven by FlightGear telemetry
#[derive(Parser, Debug)]
#[command(name = "helipanel", version, about)]
struct Cli {
    /// Log filter, e.g. `debug` or `helipanel_core=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the panel until Ctrl-C
    Run(RunArgs),

    /// Write the default configuration
    InitConfig {
        /// Target file (default: user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Render a single frame from demo data
    RenderOnce {
        /// Seed for the demo simulator
        #[arg(long, default_value_t = 1)]
        demo_seed: u64,

        /// Simulated flight time before the frame is taken
        #[arg(long, default_value_t = 10_000)]
        at_ms: u64,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Output SVG file
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Use the built-in flight simulator instead of FlightGear
    #[arg(long)]
    demo: bool,

    /// Panel configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Snapshot file (overrides output.snapshot_path)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Write the flown path as GeoJSON on exit
    #[arg(long)]
    export_track: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    max_ticks: Option<u64>,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result = match cli.command {
        Command::Run(args) => run(args).await,
        Command::InitConfig { path, force } => init_config(path, force),
        Command::RenderOnce {
            demo_seed,
            at_ms,
            config,
            out,
        } => render_once(demo_seed, at_ms, config, out),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let mut config =
        PanelConfig::load_or_default(args.config.as_deref()).context("loading panel config")?;
    if let Some(path) = args.snapshot {
        config.output.snapshot_path = path;
    }

    let mut host = SvgSnapshotHost::new(&config.output.snapshot_path, config.output.snapshot_every_ticks)?;
    let mut renderer = PanelRenderer::new(config.layout.clone());
    let mut recorder = args
        .export_track
        .as_ref()
        .map(|_| TrajectoryRecorder::new(config.trajectory.clone()));

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            token.cancel();
        }
    });

    let options = LoopOptions {
        tick_interval: config.tick_interval(),
        max_ticks: args.max_ticks,
    };

    let stats = if args.demo {
        info!("Starting in demo mode");
        let mut sim = DemoSimulator::new();
        run_panel(&mut sim, &mut renderer, &mut host, recorder.as_mut(), options, cancel).await?
    } else {
        let settings = &config.telemetry;
        let mut hub = TelemetryHub::connect(settings.clone(), config.engine_defaults)
            .await
            .with_context(|| {
                format!(
                    "connecting to FlightGear (GUI feed port {}, telnet {}:{})",
                    settings.gui_port, settings.host, settings.telnet_port
                )
            })?;
        run_panel(&mut hub, &mut renderer, &mut host, recorder.as_mut(), options, cancel).await?
    };

    info!(
        "Rendered {} frames ({} with link loss), {} snapshots written",
        stats.frames,
        stats.link_loss_frames,
        host.written()
    );

    if let (Some(path), Some(recorder)) = (args.export_track, recorder) {
        recorder
            .export_geojson(&path)
            .with_context(|| format!("exporting trajectory to {}", path.display()))?;
    }
    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => PanelConfig::default_path()?,
    };
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    PanelConfig::default().save(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn render_once(seed: u64, at_ms: u64, config: Option<PathBuf>, out: PathBuf) -> Result<()> {
    let config = PanelConfig::load_or_default(config.as_deref()).context("loading panel config")?;

    let mut sim = DemoSimulator::with_seed(seed);
    let mut state = sim.update(0);
    for ms in (100..=at_ms).step_by(100) {
        state = sim.update(ms);
    }
    let (sample, engine) = state;
    let snapshot = TelemetrySnapshot {
        sample,
        engine,
        feed_stale: false,
        pull_connected: true,
    };

    let mut renderer = PanelRenderer::new(config.layout);
    let frame = renderer.render(&PanelInput::new(&snapshot, Local::now().time()));
    write_svg_file(&frame, &out).with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote {}", out.display());
    Ok(())
}
