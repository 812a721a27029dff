//! Washer cycle detection
//!
//! Three photodiode channels sit over the washer's front panel:
//!
//! - `cycle_complete`: the "done" indicator lamp
//! - `lid_locked`: the lid lock indicator lamp
//! - `blank`: an unlit patch of panel, used as the reference
//!
//! Thresholds are ratios against the blank channel rather than absolute
//! levels, which keeps detection stable across ambient light and supply
//! drift.

use embedded_hal::delay::DelayNs;

use super::conditioner::ConditionedSignal;
use crate::config::SensorConfig;
use crate::traits::AnalogInput;

/// Detection ratios against the blank channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Thresholds {
    /// `cycle_complete` when `complete > blank × ratio`
    pub cycle_complete_ratio: f32,
    /// `lid_locked` when `lid > blank × ratio`
    pub lid_locked_ratio: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cycle_complete_ratio: 1.7,
            lid_locked_ratio: 4.0,
        }
    }
}

impl From<&SensorConfig> for Thresholds {
    fn from(config: &SensorConfig) -> Self {
        Self {
            cycle_complete_ratio: config.cycle_complete_ratio,
            lid_locked_ratio: config.lid_locked_ratio,
        }
    }
}

/// Conditioned values of the three washer channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WasherReading {
    /// Cycle-complete lamp
    pub cycle_complete_raw: u16,
    /// Reference patch
    pub blank_raw: u16,
    /// Lid-locked lamp
    pub lid_locked_raw: u16,
}

/// Physical washer state derived from a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WasherSignals {
    /// Cycle-complete lamp is lit
    pub cycle_complete: bool,
    /// Lid is locked
    pub lid_locked: bool,
}

/// Classify a reading
pub fn detect(reading: &WasherReading, thresholds: &Thresholds) -> WasherSignals {
    let blank = reading.blank_raw as f32;
    WasherSignals {
        cycle_complete: reading.cycle_complete_raw as f32 > blank * thresholds.cycle_complete_ratio,
        lid_locked: reading.lid_locked_raw as f32 > blank * thresholds.lid_locked_ratio,
    }
}

/// The three conditioned washer channels
pub struct WasherSensors<A> {
    cycle_complete: ConditionedSignal<A>,
    blank: ConditionedSignal<A>,
    lid_locked: ConditionedSignal<A>,
}

impl<A: AnalogInput> WasherSensors<A> {
    /// Wrap the three analog channels
    pub fn new(cycle_complete: A, blank: A, lid_locked: A, config: &SensorConfig) -> Self {
        Self {
            cycle_complete: ConditionedSignal::new(cycle_complete, config),
            blank: ConditionedSignal::new(blank, config),
            lid_locked: ConditionedSignal::new(lid_locked, config),
        }
    }

    /// Sample all three channels
    pub fn sample_once<D: DelayNs>(&mut self, now_ms: u64, delay: &mut D) -> WasherReading {
        WasherReading {
            cycle_complete_raw: self.cycle_complete.sample_once(now_ms, delay),
            blank_raw: self.blank.sample_once(now_ms, delay),
            lid_locked_raw: self.lid_locked.sample_once(now_ms, delay),
        }
    }
}
