//! Bounded sample window — fixed-capacity FIFO buffer of utilization
//! readings.
//!
//! Sample ingestion and the decision tick run on separate schedules,
//! so the buffer sits behind a mutex: a tick never observes a torn
//! read. Critical sections are a push or a sum, never held across an
//! await.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Fixed-capacity ordered buffer of utilization samples.
///
/// Holds at most `capacity` samples; pushing into a full window evicts
/// the oldest first. Sample values are stored as-is — the window does
/// not clamp or validate, interpretation belongs to the policy.
pub struct BoundedWindow {
    capacity: usize,
    samples: Mutex<VecDeque<f64>>,
}

impl BoundedWindow {
    /// Create a window holding up to `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append a sample, evicting the oldest if the window is full.
    pub fn push(&self, sample: f64) {
        let mut samples = self.lock();
        samples.push_back(sample);
        while samples.len() > self.capacity {
            samples.pop_front();
        }
    }

    /// Arithmetic mean of the held samples, or 0.0 when empty.
    ///
    /// The zero default makes an empty window indistinguishable from
    /// confirmed zero load; callers must treat it as "no signal", not
    /// "scale down candidate".
    pub fn average(&self) -> f64 {
        let samples = self.lock();
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of samples retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy of the held samples in arrival order, oldest first.
    pub fn samples(&self) -> Vec<f64> {
        self.lock().iter().copied().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<f64>> {
        // A poisoned lock only means a panic elsewhere mid-push; the
        // buffer itself is still a valid deque.
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
