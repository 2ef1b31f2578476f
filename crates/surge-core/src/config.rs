//! Fleet configuration parser.
//!
//! A fleet file is a TOML document with one `[[service]]` table per
//! managed service. Parsing is lenient about omitted optional keys
//! (defaults below); validation is strict and fail-fast — a bad value
//! is a [`ConfigError`], never a silently substituted default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{DEFAULT_TREND_MARGIN, InstanceBounds, PolicyConfig};

/// Top-level fleet configuration: the set of managed services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default, rename = "service")]
    pub services: Vec<ServiceConfig>,
}

/// Per-service autoscaling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    /// Lower instance bound, >= 1.
    #[serde(default = "default_min_instances")]
    pub min_instances: u32,
    pub max_instances: u32,
    /// Short-window average above this triggers scale-up (percent).
    pub scale_up_threshold: f64,
    /// Short-window average below this triggers scale-down (percent).
    pub scale_down_threshold: f64,
    /// Multiplicative scaling step, > 1.0.
    pub scale_factor: f64,
    /// Required short/long average gap for reactive rules (points).
    #[serde(default = "default_trend_margin")]
    pub trend_margin: f64,
    /// Capacity of the burst-detection window, in samples.
    pub short_window: usize,
    /// Capacity of the trend-detection window, in samples.
    pub long_window: usize,
    /// Decision tick period, e.g. "250ms", "1s", "2m".
    #[serde(default = "default_tick_interval")]
    pub tick_interval: String,
}

fn default_min_instances() -> u32 {
    1
}

fn default_trend_margin() -> f64 {
    DEFAULT_TREND_MARGIN
}

fn default_tick_interval() -> String {
    "1s".to_string()
}

impl FleetConfig {
    /// Load a fleet file from disk.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FleetConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate every service config, failing on the first error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = Vec::with_capacity(self.services.len());
        for service in &self.services {
            if seen.contains(&service.name.as_str()) {
                return Err(ConfigError::DuplicateService {
                    service: service.name.clone(),
                });
            }
            seen.push(service.name.as_str());
            service.validate()?;
        }
        Ok(())
    }
}

impl ServiceConfig {
    /// Check every invariant of the configuration surface.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_instances < 1 {
            return Err(ConfigError::MinTooLow {
                service: self.name.clone(),
                min: self.min_instances,
            });
        }
        if self.max_instances < self.min_instances {
            return Err(ConfigError::InvertedBounds {
                service: self.name.clone(),
                min: self.min_instances,
                max: self.max_instances,
            });
        }
        if self.scale_down_threshold >= self.scale_up_threshold {
            return Err(ConfigError::OverlappingThresholds {
                service: self.name.clone(),
                up: self.scale_up_threshold,
                down: self.scale_down_threshold,
            });
        }
        if !(self.scale_factor > 1.0) {
            return Err(ConfigError::FactorTooSmall {
                service: self.name.clone(),
                factor: self.scale_factor,
            });
        }
        if self.short_window < 1 {
            return Err(ConfigError::EmptyWindow {
                service: self.name.clone(),
                which: "short",
            });
        }
        if self.long_window < 1 {
            return Err(ConfigError::EmptyWindow {
                service: self.name.clone(),
                which: "long",
            });
        }
        self.tick_interval()?;
        Ok(())
    }

    /// Instance bounds for this service.
    pub fn bounds(&self) -> InstanceBounds {
        InstanceBounds {
            min: self.min_instances,
            max: self.max_instances,
        }
    }

    /// Policy parameters for this service.
    pub fn policy(&self) -> PolicyConfig {
        PolicyConfig {
            scale_up_threshold: self.scale_up_threshold,
            scale_down_threshold: self.scale_down_threshold,
            scale_factor: self.scale_factor,
            trend_margin: self.trend_margin,
        }
    }

    /// Parse the tick period.
    pub fn tick_interval(&self) -> Result<Duration, ConfigError> {
        parse_interval(&self.name, &self.tick_interval)
    }
}

/// Parse a duration string like "250ms", "30s", "5m".
///
/// Unlike a lenient parser this rejects anything it does not
/// understand; interval typos are configuration errors.
fn parse_interval(service: &str, value: &str) -> Result<Duration, ConfigError> {
    let trimmed = value.trim();
    let parsed = if let Some(ms) = trimmed.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = trimmed.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = trimmed.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        None
    };

    match parsed {
        Some(d) if !d.is_zero() => Ok(d),
        _ => Err(ConfigError::InvalidDuration {
            service: service.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_service() -> ServiceConfig {
        ServiceConfig {
            name: "api".to_string(),
            min_instances: 1,
            max_instances: 10,
            scale_up_threshold: 65.0,
            scale_down_threshold: 30.0,
            scale_factor: 1.5,
            trend_margin: 5.0,
            short_window: 5,
            long_window: 20,
            tick_interval: "1s".to_string(),
        }
    }

    #[test]
    fn parse_minimal_fleet() {
        let toml_str = r#"
[[service]]
name = "checkout"
max_instances = 10
scale_up_threshold = 65.0
scale_down_threshold = 30.0
scale_factor = 1.5
short_window = 5
long_window = 20
"#;
        let config: FleetConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.services.len(), 1);

        let service = &config.services[0];
        assert_eq!(service.name, "checkout");
        // Defaults applied.
        assert_eq!(service.min_instances, 1);
        assert_eq!(service.trend_margin, 5.0);
        assert_eq!(service.tick_interval, "1s");
        config.validate().unwrap();
    }

    #[test]
    fn rejects_inverted_bounds() {
        let mut service = base_service();
        service.min_instances = 5;
        service.max_instances = 3;
        assert!(matches!(
            service.validate(),
            Err(ConfigError::InvertedBounds { .. })
        ));
    }

    #[test]
    fn rejects_overlapping_thresholds() {
        let mut service = base_service();
        service.scale_down_threshold = 65.0;
        assert!(matches!(
            service.validate(),
            Err(ConfigError::OverlappingThresholds { .. })
        ));
    }

    #[test]
    fn rejects_factor_at_or_below_one() {
        let mut service = base_service();
        service.scale_factor = 1.0;
        assert!(matches!(
            service.validate(),
            Err(ConfigError::FactorTooSmall { .. })
        ));

        service.scale_factor = f64::NAN;
        assert!(matches!(
            service.validate(),
            Err(ConfigError::FactorTooSmall { .. })
        ));
    }

    #[test]
    fn rejects_zero_capacity_window() {
        let mut service = base_service();
        service.short_window = 0;
        assert!(matches!(
            service.validate(),
            Err(ConfigError::EmptyWindow { which: "short", .. })
        ));
    }

    #[test]
    fn rejects_duplicate_service_names() {
        let fleet = FleetConfig {
            services: vec![base_service(), base_service()],
        };
        assert!(matches!(
            fleet.validate(),
            Err(ConfigError::DuplicateService { .. })
        ));
    }

    #[test]
    fn interval_parsing() {
        assert_eq!(
            parse_interval("api", "250ms").unwrap(),
            Duration::from_millis(250)
        );
        assert_eq!(parse_interval("api", "30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_interval("api", "5m").unwrap(), Duration::from_secs(300));
        assert!(parse_interval("api", "0s").is_err());
        assert!(parse_interval("api", "soon").is_err());
        assert!(parse_interval("api", "").is_err());
        // Minutes that overflow u64 seconds are rejected, not wrapped.
        assert!(parse_interval("api", "307445734561825861m").is_err());
    }
}
