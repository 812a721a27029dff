//! Automatic washer cycle tracking
//!
//! ```text
//!          lid_locked ∧ ¬complete        complete ∧ ¬lid_locked
//!   Idle ─────────────────────────► Running ────────────────────► Done
//!    ▲                                                              │
//!    └──────────────────── ¬complete ∧ ¬lid_locked ─────────────────┘
//! ```
//!
//! Any other combination of signals leaves the state where it is. In
//! particular both lamps lit at once is treated as ambiguous and ignored
//! until the panel settles.

use alloc::string::String;

use super::alarm::AlarmState;
use super::cycle::{format_duration, CycleState};
use super::dirty::{Dirty, DirtyFlag};
use crate::signal::{WasherReading, WasherSignals};

/// Alarm cause raised when the washer finishes
pub const WASHER_CYCLE_COMPLETE: &str = "Washer cycle complete";

/// Reported auto section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoSummary {
    /// Washer cycle state
    pub washer_state: CycleState,
    /// Time since the cycle started, empty when idle
    pub washer_elapsed: String,
    /// Latest derived signals
    pub signals: WasherSignals,
    /// Latest conditioned readings, for diagnostics
    pub reading: WasherReading,
}

/// Automatic washer state
#[derive(Debug, Clone, Default)]
pub struct AutoState {
    washer: CycleState,
    started_at_ms: Option<u64>,
    finished_at_ms: Option<u64>,
    reading: WasherReading,
    signals: WasherSignals,
    dirty: DirtyFlag,
}

impl AutoState {
    /// Create an idle tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Washer cycle state
    pub fn washer_state(&self) -> CycleState {
        self.washer
    }

    /// Cycle start time (ms)
    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    /// Cycle end time (ms)
    pub fn finished_at_ms(&self) -> Option<u64> {
        self.finished_at_ms
    }

    /// Latest conditioned readings
    pub fn reading(&self) -> WasherReading {
        self.reading
    }

    /// Latest derived signals
    pub fn signals(&self) -> WasherSignals {
        self.signals
    }

    /// Feed one detection result
    pub fn update(
        &mut self,
        now_ms: u64,
        reading: WasherReading,
        signals: WasherSignals,
        alarm: &mut AlarmState,
    ) {
        self.reading = reading;
        self.signals = signals;

        let WasherSignals {
            cycle_complete,
            lid_locked,
        } = signals;

        match self.washer {
            CycleState::Idle if lid_locked && !cycle_complete => {
                info!("washer cycle started");
                self.washer = CycleState::Running;
                self.started_at_ms = Some(now_ms);
                self.finished_at_ms = None;
                self.dirty.mark();
            }
            CycleState::Running if cycle_complete && !lid_locked => {
                info!("washer cycle complete");
                self.washer = CycleState::Done;
                self.finished_at_ms = Some(now_ms);
                self.dirty.mark();
                alarm.alarm(Some(WASHER_CYCLE_COMPLETE));
            }
            CycleState::Done if !cycle_complete && !lid_locked => {
                info!("washer unloaded");
                self.washer = CycleState::Idle;
                self.started_at_ms = None;
                self.finished_at_ms = None;
                self.dirty.mark();
            }
            _ => {}
        }
    }

    /// Elapsed cycle time in seconds, if a cycle has started
    pub fn elapsed_s(&self, now_ms: u64) -> Option<u64> {
        let started = self.started_at_ms?;
        let end = self.finished_at_ms.unwrap_or(now_ms);
        Some(end.saturating_sub(started) / 1000)
    }

    /// Elapsed cycle time for display, empty when idle
    pub fn elapsed(&self, now_ms: u64) -> String {
        self.elapsed_s(now_ms)
            .map(format_duration)
            .unwrap_or_default()
    }

    /// Reported section
    pub fn summary(&self, now_ms: u64) -> AutoSummary {
        AutoSummary {
            washer_state: self.washer,
            washer_elapsed: self.elapsed(now_ms),
            signals: self.signals,
            reading: self.reading,
        }
    }
}

impl Dirty for AutoState {
    fn mark(&mut self) {
        self.dirty.mark();
    }

    fn take_changed(&mut self) -> bool {
        self.dirty.take_changed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AlarmStatus;

    const IDLE: WasherSignals = WasherSignals {
        cycle_complete: false,
        lid_locked: false,
    };
    const LOCKED: WasherSignals = WasherSignals {
        cycle_complete: false,
        lid_locked: true,
    };
    const COMPLETE: WasherSignals = WasherSignals {
        cycle_complete: true,
        lid_locked: false,
    };
    const BOTH: WasherSignals = WasherSignals {
        cycle_complete: true,
        lid_locked: true,
    };

    fn feed(auto: &mut AutoState, alarm: &mut AlarmState, now_ms: u64, signals: WasherSignals) {
        auto.update(now_ms, WasherReading::default(), signals, alarm);
    }

    #[test]
    fn test_full_cycle_scenario() {
        let mut auto = AutoState::new();
        let mut alarm = AlarmState::new(1_800_000);

        feed(&mut auto, &mut alarm, 0, LOCKED);
        assert_eq!(auto.washer_state(), CycleState::Running);
        assert_eq!(auto.started_at_ms(), Some(0));
        assert!(auto.take_changed());

        feed(&mut auto, &mut alarm, 600_000, LOCKED);
        assert_eq!(auto.washer_state(), CycleState::Running);
        assert!(!auto.take_changed());

        feed(&mut auto, &mut alarm, 1_200_000, COMPLETE);
        assert_eq!(auto.washer_state(), CycleState::Done);
        assert_eq!(auto.finished_at_ms(), Some(1_200_000));
        assert_eq!(alarm.status(), AlarmStatus::Alarm);
        let messages: alloc::vec::Vec<&str> = alarm.messages().collect();
        assert_eq!(messages, [WASHER_CYCLE_COMPLETE]);

        feed(&mut auto, &mut alarm, 1_500_000, IDLE);
        assert_eq!(auto.washer_state(), CycleState::Idle);
        assert_eq!(auto.started_at_ms(), None);
        assert_eq!(auto.finished_at_ms(), None);
    }

    #[test]
    fn test_idle_never_jumps_to_done() {
        let mut auto = AutoState::new();
        let mut alarm = AlarmState::new(1_800_000);

        for signals in [COMPLETE, IDLE, BOTH, COMPLETE] {
            feed(&mut auto, &mut alarm, 0, signals);
            assert_ne!(auto.washer_state(), CycleState::Done);
        }
        assert_eq!(alarm.status(), AlarmStatus::Idle);
    }

    #[test]
    fn test_running_never_jumps_to_idle() {
        let mut auto = AutoState::new();
        let mut alarm = AlarmState::new(1_800_000);
        feed(&mut auto, &mut alarm, 0, LOCKED);

        for signals in [IDLE, BOTH, LOCKED, IDLE] {
            feed(&mut auto, &mut alarm, 1000, signals);
            assert_eq!(auto.washer_state(), CycleState::Running);
        }
    }

    #[test]
    fn test_ambiguous_signals_freeze() {
        let mut auto = AutoState::new();
        let mut alarm = AlarmState::new(1_800_000);

        feed(&mut auto, &mut alarm, 0, BOTH);
        assert_eq!(auto.washer_state(), CycleState::Idle);

        feed(&mut auto, &mut alarm, 0, LOCKED);
        feed(&mut auto, &mut alarm, 1000, COMPLETE);
        assert_eq!(auto.washer_state(), CycleState::Done);
        auto.take_changed();

        feed(&mut auto, &mut alarm, 2000, BOTH);
        feed(&mut auto, &mut alarm, 3000, COMPLETE);
        assert_eq!(auto.washer_state(), CycleState::Done);
        assert!(!auto.take_changed());
    }

    #[test]
    fn test_elapsed() {
        let mut auto = AutoState::new();
        let mut alarm = AlarmState::new(1_800_000);
        assert_eq!(auto.elapsed(5000), "");

        feed(&mut auto, &mut alarm, 10_000, LOCKED);
        assert_eq!(auto.elapsed(75_000), "1m 5s");

        feed(&mut auto, &mut alarm, 3_730_000, COMPLETE);
        // Frozen at the finish time
        assert_eq!(auto.elapsed(9_000_000), "1h 2m 0s");
    }

    #[test]
    fn test_summary_carries_readings() {
        let mut auto = AutoState::new();
        let mut alarm = AlarmState::new(1_800_000);
        let reading = WasherReading {
            cycle_complete_raw: 1200,
            blank_raw: 1000,
            lid_locked_raw: 9000,
        };
        auto.update(0, reading, LOCKED, &mut alarm);

        let summary = auto.summary(2000);
        assert_eq!(summary.washer_state, CycleState::Running);
        assert_eq!(summary.washer_elapsed, "0m 2s");
        assert_eq!(summary.reading, reading);
        assert!(summary.signals.lid_locked);
    }
}
