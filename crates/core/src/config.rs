//! Configuration structures for the TRACE cleaner.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main configuration for the cleaning pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reporting regime configuration.
    pub regime: RegimeConfig,
    /// Correction fixpoint configuration.
    pub correction: CorrectionConfig,
    /// Settlement filter configuration.
    pub settlement: SettlementConfig,
    /// Execution configuration.
    pub execution: ExecutionConfig,
}

impl Config {
    /// Parse a JSON document. Missing sections and fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.settlement.max_days < 0 {
            return Err(Error::config(format!(
                "settlement.max_days must be non-negative, got {}",
                self.settlement.max_days
            )));
        }
        if self.correction.max_passes == Some(0) {
            return Err(Error::config("correction.max_passes must be at least 1"));
        }
        Ok(())
    }
}

/// Reporting regime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    /// First report date of the post-cutover (enhanced) regime.
    pub cutover_date: NaiveDate,
}

impl RegimeConfig {
    /// 2012-02-06, the day the post-cutover status codes took effect.
    pub fn default_cutover() -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 2, 6).unwrap_or(NaiveDate::MIN)
    }
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            cutover_date: Self::default_cutover(),
        }
    }
}

/// Correction fixpoint configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Hard cap on fixpoint passes (`None` = number of pending corrections).
    pub max_passes: Option<usize>,
}

/// Settlement filter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Maximum settlement lag in days, inclusive.
    pub max_days: i64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self { max_days: 7 }
    }
}

/// Execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Clean cusip partitions in parallel.
    pub parallel: bool,
    /// Number of parallel workers (0 = auto).
    pub workers: u32,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            workers: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.regime.cutover_date,
            NaiveDate::from_ymd_opt(2012, 2, 6).unwrap()
        );
        assert_eq!(config.settlement.max_days, 7);
        assert_eq!(config.correction.max_passes, None);
        assert!(config.execution.parallel);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json_str(
            r#"{"settlement": {"max_days": 3}, "execution": {"workers": 2}}"#,
        )
        .unwrap();
        assert_eq!(config.settlement.max_days, 3);
        assert_eq!(config.execution.workers, 2);
        assert!(config.execution.parallel);
        assert_eq!(config.regime.cutover_date, RegimeConfig::default_cutover());
    }

    #[test]
    fn test_cutover_from_json() {
        let config = Config::from_json_str(r#"{"regime": {"cutover_date": "2013-01-01"}}"#).unwrap();
        assert_eq!(
            config.regime.cutover_date,
            NaiveDate::from_ymd_opt(2013, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            Config::from_json_str(r#"{"settlement": {"max_days": -1}}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_json_str(r#"{"correction": {"max_passes": 0}}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(Config::from_json_str("{"), Err(Error::Json(_))));
    }
}
