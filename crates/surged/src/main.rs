//! surged — the Surge daemon.
//!
//! Loads a TOML fleet file, starts one autoscaler loop per service,
//! and feeds each loop a deterministic synthetic utilization curve.
//! Decisions are emitted as structured tracing events.
//!
//! # Usage
//!
//! ```text
//! surged run --config demos/fleet.toml --duration 120
//! ```

mod sink;
mod workload;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use surge_autoscale::{AutoscalerLoop, DecisionSink, ScalableTarget};
use surge_core::FleetConfig;

use sink::LogSink;
use workload::LoadCurve;

/// Seconds of cycle phase shift between consecutive services.
const PHASE_STAGGER_SECS: f64 = 17.0;

#[derive(Parser)]
#[command(name = "surged", about = "Surge autoscaler daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run autoscaler loops for every service in a fleet file.
    Run {
        /// Path to the fleet configuration.
        #[arg(long, default_value = "demos/fleet.toml")]
        config: PathBuf,

        /// Seconds to run before shutting down (0 = until ctrl-c).
        #[arg(long, default_value = "0")]
        duration: u64,

        /// Sample ingestion cadence in milliseconds.
        #[arg(long, default_value = "250")]
        ingest_interval: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,surged=debug,surge=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            duration,
            ingest_interval,
        } => run_fleet(config, duration, Duration::from_millis(ingest_interval)).await,
    }
}

async fn run_fleet(
    config_path: PathBuf,
    duration: u64,
    ingest_interval: Duration,
) -> anyhow::Result<()> {
    let fleet = FleetConfig::from_file(&config_path)?;
    fleet.validate()?;
    anyhow::ensure!(
        !fleet.services.is_empty(),
        "fleet config {} declares no services",
        config_path.display()
    );
    info!(
        config = %config_path.display(),
        services = fleet.services.len(),
        "fleet config loaded"
    );

    let sink: Arc<dyn DecisionSink> = Arc::new(LogSink);
    let (shutdown_tx, _) = watch::channel(false);

    let mut fleet_loops = Vec::new();
    for (index, service) in fleet.services.iter().enumerate() {
        let scaler = Arc::new(AutoscalerLoop::new(
            ScalableTarget::new(&service.name, service.bounds()),
            service.policy(),
            service.short_window,
            service.long_window,
            service.tick_interval()?,
            Arc::clone(&sink),
        ));
        scaler.start();

        let curve = LoadCurve::new(index as f64 * PHASE_STAGGER_SECS);
        let feeder = tokio::spawn(drive_workload(
            Arc::clone(&scaler),
            curve,
            ingest_interval,
            shutdown_tx.subscribe(),
        ));

        info!(
            service = %service.name,
            min = service.min_instances,
            max = service.max_instances,
            tick = %service.tick_interval,
            "service loop started"
        );
        fleet_loops.push((scaler, feeder));
    }

    if duration == 0 {
        tokio::signal::ctrl_c().await?;
        info!("ctrl-c received, shutting down");
    } else {
        tokio::time::sleep(Duration::from_secs(duration)).await;
        info!(duration_secs = duration, "run duration elapsed, shutting down");
    }

    let _ = shutdown_tx.send(true);
    for (scaler, feeder) in fleet_loops {
        scaler.stop();
        let _ = feeder.await;
        info!(
            service = %scaler.service(),
            instances = scaler.current_instances(),
            "final instance count"
        );
    }

    Ok(())
}

/// Feed one loop with samples from its load curve until shutdown.
async fn drive_workload(
    scaler: Arc<AutoscalerLoop>,
    curve: LoadCurve,
    cadence: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let started = tokio::time::Instant::now();
    loop {
        tokio::select! {
            _ = tokio::time::sleep(cadence) => {
                scaler.ingest(curve.sample_at(started.elapsed()));
            }
            _ = shutdown.changed() => break,
        }
    }
}
