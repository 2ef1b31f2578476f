//! surge-core — domain types and configuration for the Surge autoscaler.
//!
//! Holds the value objects shared across the engine and the daemon:
//! scaling decisions and events, policy parameters, instance bounds,
//! and the TOML fleet configuration with fail-fast validation.

pub mod config;
pub mod error;
pub mod types;

pub use config::{FleetConfig, ServiceConfig};
pub use error::ConfigError;
pub use types::{InstanceBounds, PolicyConfig, ScalingDecision, ScalingEvent};
