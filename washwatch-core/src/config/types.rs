//! Configuration type definitions
//!
//! Every field has a default, so a config file only needs to list what it
//! changes.

use heapless::String;
use serde::Deserialize;

use crate::state::Mode;

/// Maximum client id length
pub const MAX_CLIENT_ID_LEN: usize = 64;

/// Analog conditioning and detection thresholds
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct SensorConfig {
    /// Raw reads per sample burst
    pub oversample: u8,
    /// Delay between reads in a burst (µs)
    ///
    /// The indicator lamps ripple at ~250 Hz; ten reads 1.1 ms apart
    /// span more than two ripple periods.
    pub sample_spacing_us: u32,
    /// Peak-hold retention window (ms)
    pub retention_ms: u64,
    /// `cycle_complete` fires above `blank × ratio`
    pub cycle_complete_ratio: f32,
    /// `lid_locked` fires above `blank × ratio`
    pub lid_locked_ratio: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            oversample: 10,
            sample_spacing_us: 1100,
            retention_ms: 2000,
            cycle_complete_ratio: 1.7,
            lid_locked_ratio: 4.0,
        }
    }
}

/// Manual timer, snooze and screen-wake durations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct TimerConfig {
    /// Washer countdown (s)
    pub washer_runtime_s: u32,
    /// Dryer countdown (s)
    pub dryer_runtime_s: u32,
    /// Default snooze (s)
    pub snooze_s: u32,
    /// Stay awake this long after the last interaction (s)
    pub awake_s: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            washer_runtime_s: 60 * 60,
            dryer_runtime_s: 60 * 60,
            snooze_s: 30 * 60,
            awake_s: 5 * 60,
        }
    }
}

/// Cloud shadow sync settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct SyncConfig {
    /// MQTT client id, also the shadow thing name
    pub client_id: String<MAX_CLIENT_ID_LEN>,
    /// Publish at least this often even with no changes (s)
    pub heartbeat_s: u32,
    /// Wait this long before reconnecting (s)
    pub backoff_s: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let mut client_id = String::new();
        // Fits: literal is shorter than MAX_CLIENT_ID_LEN
        let _ = client_id.push_str("washwatch");
        Self {
            client_id,
            heartbeat_s: 60,
            backoff_s: 15,
        }
    }
}

/// Task cadences for the cooperative scheduler
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct ScheduleConfig {
    /// Sensor sampling and cycle detection (ms)
    pub sensor_ms: u64,
    /// Manual timer tick (ms)
    pub timer_ms: u64,
    /// Alarm/snooze tick (ms)
    pub alarm_ms: u64,
    /// Shadow sync loop (ms)
    pub sync_ms: u64,
    /// Free-heap sampler (ms)
    pub memory_ms: u64,
    /// Free-heap watermark window (ms)
    pub memory_window_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            sensor_ms: 1000,
            timer_ms: 1000,
            alarm_ms: 5000,
            sync_ms: 4000,
            memory_ms: 100,
            memory_window_ms: 5000,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct DeviceConfig {
    /// Mode selected at power-on
    pub initial_mode: Mode,
    /// Signal conditioning
    pub sensor: SensorConfig,
    /// Timers
    pub timers: TimerConfig,
    /// Cloud sync
    pub sync: SyncConfig,
    /// Scheduler cadences
    pub schedule: ScheduleConfig,
}
