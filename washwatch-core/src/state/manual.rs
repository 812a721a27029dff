//! Operator-started countdown timers
//!
//! The washer and dryer each get an independent timer. A timer is started
//! by the operator, runs for its configured duration, then raises an alarm
//! and sits in `Done` until reset.

use alloc::string::String;

use super::alarm::AlarmState;
use super::cycle::{format_duration, CycleState};
use super::dirty::{Dirty, DirtyFlag};

/// Appliances with a manual timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Appliance {
    Washer,
    Dryer,
}

impl Appliance {
    /// Display name
    pub fn label(&self) -> &'static str {
        match self {
            Appliance::Washer => "Washer",
            Appliance::Dryer => "Dryer",
        }
    }

    /// Alarm cause raised when this appliance's timer runs out
    pub fn timer_done_message(&self) -> &'static str {
        match self {
            Appliance::Washer => "Washer timer done",
            Appliance::Dryer => "Dryer timer done",
        }
    }
}

/// One countdown timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    /// Timer state
    pub state: CycleState,
    /// Configured duration (ms)
    pub runtime_ms: u64,
    /// Deadline while running (ms)
    pub timeout_at_ms: Option<u64>,
}

impl Timer {
    fn new(runtime_ms: u64) -> Self {
        Self {
            state: CycleState::Idle,
            runtime_ms,
            timeout_at_ms: None,
        }
    }

    /// Whole seconds until the deadline, if one is set
    pub fn remaining_s(&self, now_ms: u64) -> Option<u64> {
        self.timeout_at_ms
            .map(|deadline| deadline.saturating_sub(now_ms).div_ceil(1000))
    }
}

/// Reported manual section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualSummary {
    /// Washer timer state
    pub washer_state: CycleState,
    /// Washer time remaining, empty when not running
    pub washer_remaining: String,
    /// Dryer timer state
    pub dryer_state: CycleState,
    /// Dryer time remaining, empty when not running
    pub dryer_remaining: String,
}

/// Manual timer pair
#[derive(Debug, Clone)]
pub struct ManualState {
    washer: Timer,
    dryer: Timer,
    dirty: DirtyFlag,
}

impl ManualState {
    /// Create idle timers with the given durations
    pub fn new(washer_runtime_ms: u64, dryer_runtime_ms: u64) -> Self {
        Self {
            washer: Timer::new(washer_runtime_ms),
            dryer: Timer::new(dryer_runtime_ms),
            dirty: DirtyFlag::new(),
        }
    }

    /// Borrow one timer
    pub fn timer(&self, appliance: Appliance) -> &Timer {
        match appliance {
            Appliance::Washer => &self.washer,
            Appliance::Dryer => &self.dryer,
        }
    }

    fn timer_mut(&mut self, appliance: Appliance) -> &mut Timer {
        match appliance {
            Appliance::Washer => &mut self.washer,
            Appliance::Dryer => &mut self.dryer,
        }
    }

    /// Washer timer state
    pub fn washer_state(&self) -> CycleState {
        self.washer.state
    }

    /// Dryer timer state
    pub fn dryer_state(&self) -> CycleState {
        self.dryer.state
    }

    /// Start (or restart) a timer
    pub fn start(&mut self, appliance: Appliance, now_ms: u64) {
        let timer = self.timer_mut(appliance);
        timer.state = CycleState::Running;
        timer.timeout_at_ms = Some(now_ms + timer.runtime_ms);
        info!("{} timer started", appliance.label());
        self.dirty.mark();
    }

    /// Force a timer back to idle
    pub fn reset(&mut self, appliance: Appliance) {
        let timer = self.timer_mut(appliance);
        timer.state = CycleState::Idle;
        timer.timeout_at_ms = None;
        debug!("{} timer reset", appliance.label());
        self.dirty.mark();
    }

    pub fn start_washer(&mut self, now_ms: u64) {
        self.start(Appliance::Washer, now_ms);
    }

    pub fn start_dryer(&mut self, now_ms: u64) {
        self.start(Appliance::Dryer, now_ms);
    }

    pub fn reset_washer(&mut self) {
        self.reset(Appliance::Washer);
    }

    pub fn reset_dryer(&mut self) {
        self.reset(Appliance::Dryer);
    }

    /// Periodic update: finish any timer whose deadline has passed
    pub fn tick(&mut self, now_ms: u64, alarm: &mut AlarmState) {
        for appliance in [Appliance::Washer, Appliance::Dryer] {
            let timer = self.timer_mut(appliance);
            if timer.state != CycleState::Running {
                continue;
            }
            let expired = timer.timeout_at_ms.is_some_and(|deadline| now_ms > deadline);
            if expired {
                timer.state = CycleState::Done;
                timer.timeout_at_ms = None;
                info!("{} timer done", appliance.label());
                self.dirty.mark();
                alarm.alarm(Some(appliance.timer_done_message()));
            }
        }
    }

    /// Time remaining for display, empty without a deadline
    pub fn remaining(&self, appliance: Appliance, now_ms: u64) -> String {
        self.timer(appliance)
            .remaining_s(now_ms)
            .map(format_duration)
            .unwrap_or_default()
    }

    pub fn washer_remaining(&self, now_ms: u64) -> String {
        self.remaining(Appliance::Washer, now_ms)
    }

    pub fn dryer_remaining(&self, now_ms: u64) -> String {
        self.remaining(Appliance::Dryer, now_ms)
    }

    /// Reported section
    pub fn summary(&self, now_ms: u64) -> ManualSummary {
        ManualSummary {
            washer_state: self.washer.state,
            washer_remaining: self.washer_remaining(now_ms),
            dryer_state: self.dryer.state,
            dryer_remaining: self.dryer_remaining(now_ms),
        }
    }
}

impl Dirty for ManualState {
    fn mark(&mut self) {
        self.dirty.mark();
    }

    fn take_changed(&mut self) -> bool {
        self.dirty.take_changed()
    }
}
