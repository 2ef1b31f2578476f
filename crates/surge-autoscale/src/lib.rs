//! surge-autoscale — the Surge decision engine.
//!
//! For each managed service the engine keeps two bounded sample
//! windows (short for burst detection, long for trend detection), a
//! pure scaling policy, and a periodic decision loop.
//!
//! # Scaling Algorithm
//!
//! ```text
//! short = short_window.average()
//! long  = long_window.average()
//!
//! if short > up_threshold and short > long + margin:
//!     ScaleUp to min(max, ceil(current * factor))      // burst
//!
//! else if short < down_threshold and short < long - margin:
//!     ScaleDown to max(min, floor(current / factor))   // collapse
//!
//! else if long > up_threshold and current < max:
//!     ProactiveScaleUp to current + 1                  // sustained trend
//! ```
//!
//! The reactive rules take multiplicative steps so a burst is absorbed
//! quickly; the proactive rule nudges by a single instance so a
//! sustained-but-unspiky trend never over-reacts.

pub mod policy;
pub mod scaler;
pub mod target;
pub mod window;

pub use scaler::{AutoscalerLoop, DecisionSink, LoopState, TickError};
pub use target::ScalableTarget;
pub use window::BoundedWindow;
