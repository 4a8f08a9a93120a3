use anyhow::{Context, Result};
use credit_core::EngineError;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Max companies listed per cohort
    pub cohort_limit: usize,
    /// Build per-company snapshot rows on the rayon pool
    pub parallel_snapshot: bool,
    /// Factor applied to a health score before it is banded against the
    /// health percentiles. Cohort filters never use it.
    pub health_percentile_scale: f64,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            cohort_limit: 10,
            parallel_snapshot: true,
            health_percentile_scale: 1.0,
        }
    }
}

impl ScreenerConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            cohort_limit: env::var("COHORT_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("COHORT_LIMIT must be a non-negative integer")?,
            parallel_snapshot: env::var("PARALLEL_SNAPSHOT")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("PARALLEL_SNAPSHOT must be true or false")?,
            health_percentile_scale: env::var("HEALTH_PERCENTILE_SCALE")
                .unwrap_or_else(|_| "1.0".to_string())
                .parse()
                .context("HEALTH_PERCENTILE_SCALE must be a number")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.health_percentile_scale.is_finite() && self.health_percentile_scale > 0.0) {
            return Err(EngineError::Config(format!(
                "HEALTH_PERCENTILE_SCALE must be positive, got {}",
                self.health_percentile_scale
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ScreenerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cohort_limit, 10);
        assert!(config.parallel_snapshot);
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        let config = ScreenerConfig {
            health_percentile_scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }
}
