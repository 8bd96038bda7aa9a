//! Configuration for the scheduling core.
//!
//! Loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration, and unknown keys are rejected:
//!
//! ```toml
//! [scheduling]
//! max_level = 5
//! default_duration_days = 1
//!
//! [evm]
//! high_risk_below = 0.90
//! medium_risk_below = 0.95
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::evm::EvmThresholds;
use crate::models::{DEFAULT_DURATION_DAYS, MAX_LEVEL};

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub scheduling: SchedulingConfig,
    pub evm: EvmThresholds,
}

/// Mutation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulingConfig {
    /// Deepest outline level indent/move may reach (at most 5).
    pub max_level: u8,
    /// Duration of tasks created through the mutator.
    pub default_duration_days: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            max_level: MAX_LEVEL,
            default_duration_days: DEFAULT_DURATION_DAYS,
        }
    }
}

impl CoreConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: CoreConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.scheduling.max_level > MAX_LEVEL {
            return Err(ScheduleError::Config(format!(
                "scheduling.max_level must be <= {MAX_LEVEL} (got {})",
                self.scheduling.max_level
            )));
        }
        if self.scheduling.default_duration_days < 1 {
            return Err(ScheduleError::Config(format!(
                "scheduling.default_duration_days must be >= 1 (got {})",
                self.scheduling.default_duration_days
            )));
        }
        let evm = &self.evm;
        if !(evm.high_risk_below > 0.0 && evm.high_risk_below <= evm.medium_risk_below) {
            return Err(ScheduleError::Config(format!(
                "evm thresholds must satisfy 0 < high_risk_below <= medium_risk_below (got {} / {})",
                evm.high_risk_below, evm.medium_risk_below
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.scheduling.max_level, 5);
        assert!((config.evm.high_risk_below - 0.90).abs() < 1e-12);
        assert!((config.evm.medium_risk_below - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_partial_override() {
        let config = CoreConfig::from_toml_str(
            r#"
            [scheduling]
            max_level = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.scheduling.max_level, 3);
        assert_eq!(config.scheduling.default_duration_days, 1);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = CoreConfig::from_toml_str("[scheduling]\nmax_depth = 3\n").unwrap_err();
        assert!(matches!(err, ScheduleError::Toml(_)));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = CoreConfig::from_toml_str("[scheduling]\nmax_level = 9\n").unwrap_err();
        assert!(matches!(err, ScheduleError::Config(msg) if msg.contains("max_level")));

        let err = CoreConfig::from_toml_str(
            "[evm]\nhigh_risk_below = 0.97\nmedium_risk_below = 0.95\n",
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CoreConfig::load_from_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ScheduleError::Io(_)));
    }
}
