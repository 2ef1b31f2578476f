//! Autoscaler loop — the periodic decision tick for one service.
//!
//! Each loop owns one [`ScalableTarget`] and two [`BoundedWindow`]s.
//! Samples are ingested at the metric source's cadence; a separate
//! fixed-period tick reads both averages, runs the policy, applies the
//! result, and emits a [`ScalingEvent`] to the decision sink.
//!
//! A tick failure is a [`TickError`] value consumed by the loop
//! driver, which reports it and keeps ticking — one bad tick never
//! terminates the loop.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};

use surge_core::{PolicyConfig, ScalingDecision, ScalingEvent};

use crate::policy;
use crate::target::ScalableTarget;
use crate::window::BoundedWindow;

/// Receives scaling events and tick failures from the engine.
///
/// The sink owns presentation and storage; the engine never formats
/// output itself.
pub trait DecisionSink: Send + Sync {
    /// Record one applied scaling decision.
    fn record(&self, event: &ScalingEvent) -> anyhow::Result<()>;

    /// Called by the loop driver when a tick fails.
    fn tick_failed(&self, _service: &str, _error: &TickError) {}
}

/// A single decision tick's failure.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("decision sink rejected event: {0}")]
    Sink(#[source] anyhow::Error),
}

/// Observable lifecycle state of an [`AutoscalerLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Created, not yet started.
    Idle,
    /// Ticking on the configured period.
    Running,
    /// Terminal; no further ticks.
    Stopped,
}

/// Owned handle to the running ticker task.
struct TickerHandle {
    handle: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

enum Lifecycle {
    Idle,
    Running(TickerHandle),
    Stopped,
}

/// The shared pieces a tick operates on, split out so the spawned
/// ticker task and direct callers run the same code.
struct LoopCore {
    target: ScalableTarget,
    policy: PolicyConfig,
    short_window: BoundedWindow,
    long_window: BoundedWindow,
    sink: Arc<dyn DecisionSink>,
}

impl LoopCore {
    /// One decision tick: read averages, decide, apply, emit.
    fn monitor_and_scale(&self) -> Result<ScalingDecision, TickError> {
        let short_avg = self.short_window.average();
        let long_avg = self.long_window.average();
        let current = self.target.current_instances();

        let decision = policy::decide(
            short_avg,
            long_avg,
            current,
            self.target.bounds(),
            &self.policy,
        );

        if let Some(to) = decision.target() {
            self.target.scale_to(to);
            let event = ScalingEvent {
                timestamp: epoch_secs(),
                service: self.target.name().to_string(),
                decision,
                short_avg,
                long_avg,
            };
            self.sink.record(&event).map_err(TickError::Sink)?;
        }

        Ok(decision)
    }
}

/// Periodic decision loop for one service.
///
/// Lifecycle: Idle → Running → Stopped. [`AutoscalerLoop::start`] and
/// [`AutoscalerLoop::stop`] are idempotent; Stopped is terminal.
/// [`AutoscalerLoop::ingest`] is legal in Idle and Running — samples
/// buffer into the windows but have no effect until a tick runs.
pub struct AutoscalerLoop {
    core: Arc<LoopCore>,
    period: Duration,
    lifecycle: Mutex<Lifecycle>,
}

impl AutoscalerLoop {
    /// Create a loop in the Idle state.
    pub fn new(
        target: ScalableTarget,
        policy: PolicyConfig,
        short_capacity: usize,
        long_capacity: usize,
        period: Duration,
        sink: Arc<dyn DecisionSink>,
    ) -> Self {
        Self {
            core: Arc::new(LoopCore {
                target,
                policy,
                short_window: BoundedWindow::new(short_capacity),
                long_window: BoundedWindow::new(long_capacity),
                sink,
            }),
            period,
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    /// Name of the managed service.
    pub fn service(&self) -> &str {
        self.core.target.name()
    }

    /// Current instance count of the managed target.
    pub fn current_instances(&self) -> u32 {
        self.core.target.current_instances()
    }

    /// Current (short, long) window fill levels.
    pub fn window_sizes(&self) -> (usize, usize) {
        (self.core.short_window.len(), self.core.long_window.len())
    }

    /// Push a utilization sample into both windows.
    ///
    /// Legal in any state; in Idle the sample simply waits for the
    /// first tick, after Stopped it is retained but never read.
    pub fn ingest(&self, sample: f64) {
        trace!(service = %self.core.target.name(), sample, "sample ingested");
        self.core.short_window.push(sample);
        self.core.long_window.push(sample);
    }

    /// Run one decision tick immediately, outside the schedule.
    pub fn monitor_and_scale(&self) -> Result<ScalingDecision, TickError> {
        self.core.monitor_and_scale()
    }

    /// Observable lifecycle state.
    pub fn state(&self) -> LoopState {
        match *self.lock_lifecycle() {
            Lifecycle::Idle => LoopState::Idle,
            Lifecycle::Running(_) => LoopState::Running,
            Lifecycle::Stopped => LoopState::Stopped,
        }
    }

    /// Start ticking on the configured period. No-op unless Idle.
    pub fn start(&self) {
        let mut lifecycle = self.lock_lifecycle();
        if !matches!(*lifecycle, Lifecycle::Idle) {
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_scaling_loop(
            Arc::clone(&self.core),
            self.period,
            shutdown_rx,
        ));
        *lifecycle = Lifecycle::Running(TickerHandle {
            handle,
            shutdown_tx,
        });
    }

    /// Stop ticking. Terminal; no-op unless Running.
    ///
    /// Signals the ticker and returns without joining it: no new tick
    /// starts after this, and an in-flight tick is left to complete
    /// rather than being aborted.
    pub fn stop(&self) {
        let mut lifecycle = self.lock_lifecycle();
        if !matches!(*lifecycle, Lifecycle::Running(_)) {
            return;
        }

        if let Lifecycle::Running(ticker) = std::mem::replace(&mut *lifecycle, Lifecycle::Stopped)
        {
            let _ = ticker.shutdown_tx.send(true);
            drop(ticker.handle);
        }
    }

    fn lock_lifecycle(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The ticker task: sleep one period, tick, repeat until shutdown.
async fn run_scaling_loop(
    core: Arc<LoopCore>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(
        service = %core.target.name(),
        period_ms = period.as_millis() as u64,
        "autoscaler loop started"
    );

    loop {
        // Shutdown is checked before the period timer: once stop() has
        // returned, no new tick may start even if both are ready in
        // the same poll.
        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                info!(service = %core.target.name(), "autoscaler loop shutting down");
                break;
            }
            _ = tokio::time::sleep(period) => {
                match core.monitor_and_scale() {
                    Ok(ScalingDecision::NoAction) => {}
                    Ok(decision) => {
                        debug!(
                            service = %core.target.name(),
                            action = decision.kind(),
                            instances = core.target.current_instances(),
                            "scaling decision applied"
                        );
                    }
                    Err(e) => {
                        core.sink.tick_failed(core.target.name(), &e);
                        error!(service = %core.target.name(), error = %e, "tick failed");
                    }
                }
            }
        }
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
