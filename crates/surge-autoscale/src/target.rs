//! Scalable target — one managed service's instance count and bounds.

use std::sync::atomic::{AtomicU32, Ordering};

use surge_core::InstanceBounds;

/// A managed unit: identity, live instance count, and [min, max]
/// bounds.
///
/// The count is an atomic so the decision loop's writes are never torn
/// against concurrent reads (demo printing, tests). Only the owning
/// loop ever writes.
pub struct ScalableTarget {
    name: String,
    instances: AtomicU32,
    bounds: InstanceBounds,
}

impl ScalableTarget {
    /// Create a target starting at its minimum instance count.
    pub fn new(name: impl Into<String>, bounds: InstanceBounds) -> Self {
        Self {
            name: name.into(),
            instances: AtomicU32::new(bounds.min),
            bounds,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> InstanceBounds {
        self.bounds
    }

    /// Current instance count.
    pub fn current_instances(&self) -> u32 {
        self.instances.load(Ordering::Relaxed)
    }

    /// Set the instance count to `max(min, n)`.
    ///
    /// Callers are expected to have clamped against `max` already; the
    /// floor here only guards against degenerate external calls.
    /// Returns the count actually applied.
    pub fn scale_to(&self, n: u32) -> u32 {
        let applied = n.max(self.bounds.min);
        self.instances.store(applied, Ordering::Relaxed);
        applied
    }
}
