//! Domain types for the Surge autoscaler.
//!
//! These are the value objects that flow between the decision engine
//! and its collaborators: instance bounds, policy parameters, and the
//! scaling decisions and events the engine emits.

use serde::{Deserialize, Serialize};

/// Default gap required between the short and long averages before a
/// reactive rule fires, in percentage points.
pub const DEFAULT_TREND_MARGIN: f64 = 5.0;

/// Min/max instance count for a scalable service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceBounds {
    /// Lower bound, always >= 1.
    pub min: u32,
    /// Upper bound, always >= min.
    pub max: u32,
}

impl InstanceBounds {
    /// Clamp a count into `[min, max]`.
    pub fn clamp(&self, count: u32) -> u32 {
        count.clamp(self.min, self.max)
    }
}

/// Thresholds and factor driving the scaling policy.
///
/// Immutable after construction; one instance per service. Validated
/// by [`crate::ServiceConfig::validate`] before the engine ever sees it
/// (`scale_down_threshold < scale_up_threshold`, `scale_factor > 1.0`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
    /// Short-window average above this triggers reactive scale-up, in
    /// utilization percent.
    pub scale_up_threshold: f64,
    /// Short-window average below this triggers reactive scale-down.
    pub scale_down_threshold: f64,
    /// Multiplicative step, shared by both directions: up uses
    /// `ceil(current * factor)`, down uses `floor(current / factor)`.
    pub scale_factor: f64,
    /// Required gap between short and long averages for the reactive
    /// rules, in percentage points.
    pub trend_margin: f64,
}

/// One scaling transition decided by the policy.
///
/// `from`/`to` are instance counts; `to` is already clamped into the
/// service's bounds. A value object, never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingDecision {
    /// No rule fired, or the clamped target did not move the count.
    NoAction,
    /// Reactive multiplicative scale-up: a short-window spike outran
    /// the long-window trend.
    ScaleUp { from: u32, to: u32 },
    /// Reactive multiplicative scale-down: short-window utilization
    /// collapsed below the trend.
    ScaleDown { from: u32, to: u32 },
    /// Single-instance nudge: the long-window trend alone is elevated
    /// without a short-window spike.
    ProactiveScaleUp { from: u32, to: u32 },
}

impl ScalingDecision {
    /// The new instance count, or `None` for [`ScalingDecision::NoAction`].
    pub fn target(&self) -> Option<u32> {
        match *self {
            ScalingDecision::NoAction => None,
            ScalingDecision::ScaleUp { to, .. }
            | ScalingDecision::ScaleDown { to, .. }
            | ScalingDecision::ProactiveScaleUp { to, .. } => Some(to),
        }
    }

    /// Short label for logs and event records.
    pub fn kind(&self) -> &'static str {
        match self {
            ScalingDecision::NoAction => "no_action",
            ScalingDecision::ScaleUp { .. } => "scale_up",
            ScalingDecision::ScaleDown { .. } => "scale_down",
            ScalingDecision::ProactiveScaleUp { .. } => "proactive_scale_up",
        }
    }
}

/// A scaling event emitted to the observability sink.
///
/// Produced once per applied (non-NoAction) decision; carries the two
/// window averages that justified the transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingEvent {
    /// Unix timestamp (seconds) when the decision was applied.
    pub timestamp: u64,
    /// Name of the scaled service.
    pub service: String,
    /// The applied decision, never `NoAction`.
    pub decision: ScalingDecision,
    /// Short-window average at decision time.
    pub short_avg: f64,
    /// Long-window average at decision time.
    pub long_avg: f64,
}
