//! Tracing-backed decision sink.
//!
//! The engine hands every applied decision to this sink; formatting
//! lives here, never in the engine.

use tracing::{info, warn};

use surge_autoscale::{DecisionSink, TickError};
use surge_core::{ScalingDecision, ScalingEvent};

/// Emits scaling events as structured tracing records.
pub struct LogSink;

impl DecisionSink for LogSink {
    fn record(&self, event: &ScalingEvent) -> anyhow::Result<()> {
        let (from, to) = match event.decision {
            ScalingDecision::ScaleUp { from, to }
            | ScalingDecision::ScaleDown { from, to }
            | ScalingDecision::ProactiveScaleUp { from, to } => (from, to),
            // The engine never emits NoAction.
            ScalingDecision::NoAction => return Ok(()),
        };

        info!(
            service = %event.service,
            action = event.decision.kind(),
            from,
            to,
            short_avg = event.short_avg,
            long_avg = event.long_avg,
            timestamp = event.timestamp,
            "scaling decision"
        );
        Ok(())
    }

    fn tick_failed(&self, service: &str, error: &TickError) {
        warn!(%service, error = %error, "tick failed");
    }
}
