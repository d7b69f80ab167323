//! Engine configuration
//!
//! Loaded from JSON (string or file) with serde defaults for every field,
//! then optionally overridden from `NUTRI_*` environment variables.

use crate::error::ComputeError;
use crate::macros::RemainderPolicy;
use crate::progress::DEFAULT_HISTORY_LIMIT;
use crate::validation::parse_date;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_REMAINDER_POLICY: &str = "NUTRI_REMAINDER_POLICY";
pub const ENV_WEIGHT_HISTORY_LIMIT: &str = "NUTRI_WEIGHT_HISTORY_LIMIT";
pub const ENV_REFERENCE_DATE: &str = "NUTRI_REFERENCE_DATE";

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Macro split behaviour when protein exceeds the calorie goal
    #[serde(default)]
    pub remainder_policy: RemainderPolicy,
    /// Maximum weight entries kept in a history
    #[serde(default = "default_history_limit")]
    pub weight_history_limit: usize,
    /// Fixed "today" for age and projections; the current UTC date when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<NaiveDate>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            remainder_policy: RemainderPolicy::default(),
            weight_history_limit: DEFAULT_HISTORY_LIMIT,
            reference_date: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ComputeError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Defaults overridden by the environment
    pub fn from_env() -> Result<Self, ComputeError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ComputeError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ComputeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_REMAINDER_POLICY) {
            self.remainder_policy = value
                .trim()
                .parse()
                .map_err(|e| ComputeError::InvalidConfig(format!("{ENV_REMAINDER_POLICY}: {e}")))?;
        }

        if let Some(value) = lookup(ENV_WEIGHT_HISTORY_LIMIT) {
            self.weight_history_limit = value.trim().parse().map_err(|_| {
                ComputeError::InvalidConfig(format!(
                    "{ENV_WEIGHT_HISTORY_LIMIT}: expected a positive integer, got '{value}'"
                ))
            })?;
        }

        if let Some(value) = lookup(ENV_REFERENCE_DATE) {
            let date = parse_date(&value).ok_or_else(|| {
                ComputeError::DateParseError(format!("{ENV_REFERENCE_DATE}: '{value}'"))
            })?;
            self.reference_date = Some(date);
        }

        tracing::debug!(
            policy = self.remainder_policy.as_str(),
            history_limit = self.weight_history_limit,
            "configuration overrides applied"
        );

        self.validate()
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.weight_history_limit == 0 {
            return Err(ComputeError::InvalidConfig(
                "weight_history_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// The configured reference date, or the current UTC date
    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}
