//! Runtime configuration: thresholds, settle delays, and history limits.
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! yields a usable configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};
use crate::time::millis_to_micros;

/// Default pose-accuracy threshold (meters / degrees).
pub const DEFAULT_ACCURACY_THRESHOLD: f64 = 5.0;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Upper bound (exclusive) for horizontal, vertical, and yaw accuracy.
    pub accuracy_threshold: f64,
    /// Wait after a permission request before re-checking.
    pub permission_settle_ms: u64,
    /// Wait after enabling the geospatial capability before re-checking.
    pub capability_settle_ms: u64,
    /// Interval between feature-support polls.
    pub feature_poll_interval_ms: u64,
    /// Bound on waiting for the location service to leave `Initializing`.
    pub location_start_timeout_ms: Option<u64>,
    /// Bound on waiting for a runtime capability-check or install request.
    pub runtime_op_timeout_ms: Option<u64>,
    /// Anchor history limits.
    pub history: HistoryConfig,
}

/// Anchor history limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of records kept; the oldest is evicted first.
    pub max_entries: usize,
    /// Records this many calendar days old (or older) are evicted on load.
    pub max_age_days: i64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            accuracy_threshold: DEFAULT_ACCURACY_THRESHOLD,
            permission_settle_ms: 3_000,
            capability_settle_ms: 3_000,
            feature_poll_interval_ms: 100,
            location_start_timeout_ms: Some(30_000),
            runtime_op_timeout_ms: Some(60_000),
            history: HistoryConfig::default(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: 20,
            max_age_days: 1,
        }
    }
}

impl GateConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GateConfig = serde_json::from_str(json)
            .map_err(|e| GateError::InvalidConfig(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GateError::NotFound(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values that would make the state machines misbehave.
    pub fn validate(&self) -> Result<()> {
        if !self.accuracy_threshold.is_finite() || self.accuracy_threshold <= 0.0 {
            return Err(GateError::InvalidConfig(format!(
                "accuracy_threshold must be a positive finite number, got {}",
                self.accuracy_threshold
            )));
        }
        if self.feature_poll_interval_ms == 0 {
            return Err(GateError::InvalidConfig(
                "feature_poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.history.max_entries == 0 {
            return Err(GateError::InvalidConfig(
                "history.max_entries must be greater than zero".to_string(),
            ));
        }
        if self.history.max_age_days <= 0 {
            return Err(GateError::InvalidConfig(format!(
                "history.max_age_days must be at least 1, got {}",
                self.history.max_age_days
            )));
        }
        Ok(())
    }

    pub(crate) fn permission_settle_micros(&self) -> u64 {
        millis_to_micros(self.permission_settle_ms)
    }

    pub(crate) fn capability_settle_micros(&self) -> u64 {
        millis_to_micros(self.capability_settle_ms)
    }

    pub(crate) fn feature_poll_interval_micros(&self) -> u64 {
        millis_to_micros(self.feature_poll_interval_ms)
    }

    pub(crate) fn location_start_timeout_micros(&self) -> Option<u64> {
        self.location_start_timeout_ms.map(millis_to_micros)
    }

    pub(crate) fn runtime_op_timeout_micros(&self) -> Option<u64> {
        self.runtime_op_timeout_ms.map(millis_to_micros)
    }
}
