//! Engine configuration
//!
//! All durations are expressed in milliseconds when loaded from TOML:
//!
//! ```toml
//! threshold = 150.0
//! ready_timeout_ms = 2000
//! settle_delay_ms = 150
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Default bound on how long a newly selected view may take to realize
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_millis(2000);

/// Default delay between reconciling a new view and making it live
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(150);

/// Offsets closer than this (in view units) count as already synchronized
pub const DEFAULT_EPSILON: f64 = 0.5;

/// Default polling interval for the async readiness wait (one 60Hz frame)
pub const DEFAULT_READY_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Configuration surface of the synchronization engine
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Scroll distance that maps to progress = 1
    pub threshold: f64,
    /// Readiness wait bound
    #[serde(rename = "ready_timeout_ms", with = "millis")]
    pub ready_timeout: Duration,
    /// Settle delay before a freshly bound view becomes the live source
    #[serde(rename = "settle_delay_ms", with = "millis")]
    pub settle_delay: Duration,
    /// Tolerance for "already synchronized" offsets
    pub epsilon: f64,
    /// Poll interval used by [`crate::readiness::wait_until_ready`]
    #[serde(rename = "ready_poll_interval_ms", with = "millis")]
    pub ready_poll_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            epsilon: DEFAULT_EPSILON,
            ready_poll_interval: DEFAULT_READY_POLL_INTERVAL,
        }
    }
}

impl SyncConfig {
    /// Config with the given threshold and default timings
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: SyncConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.threshold.is_nan() || self.threshold < 0.0 {
            return Err(SyncError::NegativeThreshold(self.threshold));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(SyncError::InvalidConfig(format!(
                "epsilon must be a finite non-negative number, got {}",
                self.epsilon
            )));
        }
        if self.ready_poll_interval.is_zero() {
            return Err(SyncError::InvalidConfig(
                "ready_poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{ser, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).map_err(|_| {
            <S::Error as ser::Error>::custom(format!("{:?} does not fit in u64 milliseconds", value))
        })?;
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
