//! Synthetic utilization source for the demo fleet.
//!
//! Generates a deterministic phased load curve — idle, ramp, sustained
//! burst, cooldown — with a small sine ripple on top. No RNG: the same
//! elapsed time always yields the same sample, so demo runs are
//! reproducible.

use std::time::Duration;

/// One full load cycle, in seconds.
const CYCLE_SECS: f64 = 60.0;

const IDLE_LEVEL: f64 = 20.0;
const BURST_LEVEL: f64 = 85.0;
const QUIET_LEVEL: f64 = 12.0;

/// Deterministic utilization curve, phase-shiftable per service.
#[derive(Debug, Clone, Copy)]
pub struct LoadCurve {
    phase_offset_secs: f64,
}

impl LoadCurve {
    /// Create a curve shifted by `phase_offset_secs` into the cycle,
    /// so multiple services never burst in lockstep.
    pub fn new(phase_offset_secs: f64) -> Self {
        Self { phase_offset_secs }
    }

    /// Utilization sample (percent, >= 0) at the given elapsed time.
    pub fn sample_at(&self, elapsed: Duration) -> f64 {
        let t = (elapsed.as_secs_f64() + self.phase_offset_secs).rem_euclid(CYCLE_SECS);

        let base = if t < 15.0 {
            IDLE_LEVEL
        } else if t < 25.0 {
            // Ramp up over 10 seconds.
            lerp(IDLE_LEVEL, BURST_LEVEL, (t - 15.0) / 10.0)
        } else if t < 40.0 {
            BURST_LEVEL
        } else if t < 50.0 {
            // Cool down over 10 seconds.
            lerp(BURST_LEVEL, QUIET_LEVEL, (t - 40.0) / 10.0)
        } else {
            QUIET_LEVEL
        };

        let ripple = (t * std::f64::consts::TAU / 7.0).sin() * 3.0;
        (base + ripple).max(0.0)
    }
}

fn lerp(from: f64, to: f64, fraction: f64) -> f64 {
    from + (to - from) * fraction
}
