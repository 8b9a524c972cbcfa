//! EMG fatigue monitor: simulated armband → fatigue pipeline → haptic alerts

mod config;
mod haptics;
mod monitor;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::MonitorConfig;
use fatigue_processing::FatiguePipeline;
use fatigue_simulation::{start_sample_stream, wait_for_device, SignalPattern};
use haptics::{HapticDriver, LogVibrator};
use monitor::Monitor;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "fatigue-monitor")]
#[command(about = "Detects muscle fatigue from an 8-channel EMG armband")]
#[command(version)]
struct CliArgs {
    /// TOML configuration file; defaults are used when omitted
    #[arg(short, long, env = "FATIGUE_MONITOR_CONFIG")]
    config: Option<PathBuf>,

    /// Stop after this many samples
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Seed the simulated armband for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Activation preset for the simulated armband (rest, steady, reps, warmup, fatigue)
    #[arg(long)]
    pattern: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn load_config(args: &CliArgs) -> Result<MonitorConfig> {
    let mut config = match &args.config {
        Some(path) => MonitorConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => MonitorConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.stream.simulator.seed = Some(seed);
    }
    if let Some(name) = &args.pattern {
        let Some(pattern) = SignalPattern::preset(name) else {
            let known: Vec<&str> = SignalPattern::presets().into_iter().map(|(n, _)| n).collect();
            bail!("Unknown pattern '{}', expected one of: {}", name, known.join(", "));
        };
        config.stream.simulator.pattern = pattern;
    }
    config.sync_sample_rate();
    config.validate().context("Invalid configuration")?;

    Ok(config)
}

fn init_logging(config: &MonitorConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_target(config.logging.with_target)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c, running until the stream ends");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = load_config(&args)?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    init_logging(&config);
    info!(
        pattern = config.stream.simulator.pattern.description(),
        tick_rate_hz = config.stream.tick_rate_hz,
        x_axis = ?config.pipeline.x_axis,
        "Starting fatigue monitor"
    );

    let pipeline = FatiguePipeline::new(config.pipeline.clone()).context("Failed to build pipeline")?;

    let device = wait_for_device(config.stream.simulator.clone(), config.search_timeout())
        .await
        .context("Could not pair with the armband")?;

    let (samples, control, stream_handle) =
        start_sample_stream(config.stream.clone(), device).context("Failed to start sample stream")?;

    let (alert_tx, alert_rx) = mpsc::channel(config.haptics.alert_buffer);
    let driver = HapticDriver::new(config.haptics.clone(), LogVibrator::default())
        .context("Failed to set up haptics")?;
    let haptics_handle = tokio::spawn(driver.run(alert_rx));

    // about one second of zeroed samples before warning about contact
    let silence_threshold = config.stream.tick_rate_hz.ceil() as u64;
    let monitor = Monitor::new(pipeline, alert_tx, args.max_ticks, silence_threshold);
    let summary = monitor.run(samples, shutdown_signal()).await;

    // Closing the control channel ends the stream; the monitor dropped the
    // alert sender, so the driver finishes any queued patterns and exits.
    drop(control);
    let stream_stats = stream_handle
        .await
        .context("Sample stream task panicked")?
        .context("Sample stream failed")?;
    let haptic_stats = haptics_handle.await.context("Haptic driver task panicked")?;

    info!(
        reason = ?summary.stop_reason,
        samples = summary.pipeline.samples_processed,
        cycles = summary.pipeline.cycles_completed,
        alerts = summary.pipeline.alerts_raised,
        dropped = summary.alerts_dropped,
        ticks_sent = stream_stats.ticks_sent,
        patterns_played = haptic_stats.alerts_played,
        "Fatigue monitor stopped"
    );

    Ok(())
}
