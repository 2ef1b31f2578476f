//! Error types for Surge configuration.

use thiserror::Error;

/// Errors detected while validating a fleet configuration.
///
/// Invalid configs are rejected at construction time and never
/// silently corrected.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("service {service}: min_instances must be >= 1 (got {min})")]
    MinTooLow { service: String, min: u32 },

    #[error("service {service}: max_instances ({max}) must be >= min_instances ({min})")]
    InvertedBounds { service: String, min: u32, max: u32 },

    #[error(
        "service {service}: scale_down_threshold ({down}) must be below scale_up_threshold ({up})"
    )]
    OverlappingThresholds { service: String, up: f64, down: f64 },

    #[error("service {service}: scale_factor must be > 1.0 (got {factor})")]
    FactorTooSmall { service: String, factor: f64 },

    #[error("service {service}: {which} window capacity must be >= 1")]
    EmptyWindow { service: String, which: &'static str },

    #[error("service {service}: invalid duration {value:?} (expected e.g. \"250ms\", \"1s\", \"2m\")")]
    InvalidDuration { service: String, value: String },

    #[error("service {service} is configured more than once")]
    DuplicateService { service: String },
}
