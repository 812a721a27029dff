//! Configuration loading
//!
//! Parses TOML into [`DeviceConfig`] and validates it. Falls back to the
//! embedded `device.toml` when the board has nothing better to offer.

use super::types::DeviceConfig;
use crate::signal::HISTORY_CAPACITY;

/// Embedded default configuration (compiled into the crate)
/// Edit device.toml and rebuild to customize
pub const EMBEDDED_CONFIG: &str = include_str!("../../device.toml");

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML parsing failed
    #[error("invalid TOML")]
    TomlParse,
    /// Oversample count must be at least 1
    #[error("sensor.oversample must be at least 1")]
    ZeroOversample,
    /// Detection ratios must be positive and finite
    #[error("detection ratios must be positive")]
    InvalidRatio,
    /// A period or duration is zero
    #[error("periods and durations must be non-zero")]
    ZeroPeriod,
    /// Retention window holds more sensor samples than the envelope can keep
    #[error("sensor.retention_ms spans too many sensor samples")]
    RetentionTooLong,
    /// Client id is empty
    #[error("sync.client_id is empty")]
    EmptyClientId,
}

/// Parse and validate a TOML configuration
pub fn parse_config(input: &str) -> Result<DeviceConfig, ConfigError> {
    let config: DeviceConfig = toml::from_str(input).map_err(|_| ConfigError::TomlParse)?;
    config.validate()?;
    Ok(config)
}

impl DeviceConfig {
    /// Load the embedded default configuration
    pub fn embedded() -> Result<Self, ConfigError> {
        parse_config(EMBEDDED_CONFIG)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensor.oversample == 0 {
            return Err(ConfigError::ZeroOversample);
        }

        for ratio in [
            self.sensor.cycle_complete_ratio,
            self.sensor.lid_locked_ratio,
        ] {
            if !(ratio.is_finite() && ratio > 0.0) {
                return Err(ConfigError::InvalidRatio);
            }
        }

        let schedule = &self.schedule;
        let periods = [
            self.sensor.retention_ms,
            schedule.sensor_ms,
            schedule.timer_ms,
            schedule.alarm_ms,
            schedule.sync_ms,
            schedule.memory_ms,
            schedule.memory_window_ms,
            self.timers.washer_runtime_s as u64,
            self.timers.dryer_runtime_s as u64,
            self.timers.snooze_s as u64,
            self.sync.heartbeat_s as u64,
            self.sync.backoff_s as u64,
        ];
        if periods.contains(&0) {
            return Err(ConfigError::ZeroPeriod);
        }

        // Every sample inside the window must fit in the peak envelope
        if self.sensor.retention_ms.div_ceil(schedule.sensor_ms) >= HISTORY_CAPACITY as u64 {
            return Err(ConfigError::RetentionTooLong);
        }

        if self.sync.client_id.is_empty() {
            return Err(ConfigError::EmptyClientId);
        }

        Ok(())
    }
}
