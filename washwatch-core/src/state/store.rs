//! Aggregate state store
//!
//! Owns every appliance state machine plus the operating mode and decides
//! when a report is due. All mutation goes through `&mut StateStore`, so the
//! render side and the sync side never see a half-applied update.

use serde::Deserialize;

use washwatch_protocol::DeltaMessage;

use super::alarm::{AlarmState, DeltaError};
use super::auto::AutoState;
use super::dirty::{Dirty, DirtyFlag};
use super::manual::ManualState;
use super::memory::MemoryWatermark;
use super::report::ReportedState;
use crate::config::DeviceConfig;
use crate::signal::{detect, Thresholds, WasherReading};

/// Which washer view is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Follow the washer's indicator lamps
    Auto,
    /// Operator-started timers
    #[default]
    Manual,
}

impl Mode {
    /// Name as shown on screen and in the shadow
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Auto => "Auto",
            Mode::Manual => "Manual",
        }
    }
}

/// Everything the device knows about the laundry
#[derive(Debug, Clone)]
pub struct StateStore {
    alarm: AlarmState,
    auto: AutoState,
    manual: ManualState,
    memory: MemoryWatermark,
    mode: Mode,
    last_interaction_ms: Option<u64>,
    awake_ms: u64,
    dirty: DirtyFlag,
}

impl StateStore {
    /// Build the store from configuration
    pub fn new(config: &DeviceConfig) -> Self {
        let timers = &config.timers;
        Self {
            alarm: AlarmState::new(u64::from(timers.snooze_s) * 1000),
            auto: AutoState::new(),
            manual: ManualState::new(
                u64::from(timers.washer_runtime_s) * 1000,
                u64::from(timers.dryer_runtime_s) * 1000,
            ),
            memory: MemoryWatermark::new(config.schedule.memory_window_ms),
            mode: config.initial_mode,
            last_interaction_ms: None,
            awake_ms: u64::from(timers.awake_s) * 1000,
            dirty: DirtyFlag::new(),
        }
    }

    pub fn alarm(&self) -> &AlarmState {
        &self.alarm
    }

    pub fn alarm_mut(&mut self) -> &mut AlarmState {
        &mut self.alarm
    }

    pub fn auto(&self) -> &AutoState {
        &self.auto
    }

    pub fn manual(&self) -> &ManualState {
        &self.manual
    }

    pub fn manual_mut(&mut self) -> &mut ManualState {
        &mut self.manual
    }

    pub fn memory(&self) -> &MemoryWatermark {
        &self.memory
    }

    /// Active mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch mode
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            info!("mode set to {}", mode.as_str());
        }
        self.mode = mode;
        self.dirty.mark();
    }

    /// Record operator interaction, keeping the screen awake
    pub fn tickle(&mut self, now_ms: u64) {
        self.last_interaction_ms = Some(now_ms);
    }

    /// Check whether the screen should stay on
    ///
    /// True while the alarm is sounding, while the active mode has a
    /// non-idle appliance, or shortly after the last interaction.
    pub fn is_awake(&self, now_ms: u64) -> bool {
        if self.alarm.is_sounding() {
            return true;
        }

        let busy = match self.mode {
            Mode::Auto => !self.auto.washer_state().is_idle(),
            Mode::Manual => {
                !self.manual.washer_state().is_idle() || !self.manual.dryer_state().is_idle()
            }
        };
        if busy {
            return true;
        }

        self.last_interaction_ms
            .is_some_and(|last| now_ms < last + self.awake_ms)
    }

    /// Read and clear the aggregate dirty flag
    ///
    /// Every component's flag is cleared, not just the first one found set.
    pub fn should_report_now(&mut self) -> bool {
        self.take_changed()
    }

    /// Apply an inbound shadow delta
    pub fn handle_delta(&mut self, now_ms: u64, delta: &DeltaMessage) -> Result<(), DeltaError> {
        if let Some(alarm) = &delta.state.alarm {
            self.alarm.handle_delta(now_ms, alarm)?;
        }
        Ok(())
    }

    /// Feed one washer reading through detection into the auto tracker
    pub fn update_washer(&mut self, now_ms: u64, reading: WasherReading, thresholds: &Thresholds) {
        let signals = detect(&reading, thresholds);
        self.auto.update(now_ms, reading, signals, &mut self.alarm);
    }

    /// Timer cadence
    pub fn tick_timers(&mut self, now_ms: u64) {
        self.manual.tick(now_ms, &mut self.alarm);
    }

    /// Alarm cadence
    pub fn tick_alarm(&mut self, now_ms: u64) {
        self.alarm.tick(now_ms);
    }

    /// Memory cadence
    pub fn sample_memory(&mut self, now_ms: u64, free_bytes: usize) {
        self.memory.sample(now_ms, free_bytes);
    }

    /// Snapshot the reported state
    ///
    /// Leaves every dirty flag untouched.
    pub fn reported(&self, now_ms: u64) -> ReportedState {
        ReportedState {
            now_s: now_ms as f64 / 1000.0,
            mode: self.mode,
            auto: self.auto.summary(now_ms),
            manual: self.manual.summary(now_ms),
            alarm: self.alarm.summary(),
        }
    }
}

impl Dirty for StateStore {
    fn mark(&mut self) {
        self.dirty.mark();
    }

    fn take_changed(&mut self) -> bool {
        // Non-short-circuit so every flag is consumed
        self.dirty.take_changed()
            | self.alarm.take_changed()
            | self.auto.take_changed()
            | self.manual.take_changed()
    }
}
