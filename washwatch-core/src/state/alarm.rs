//! Alarm / snooze state machine
//!
//! ```text
//!            alarm()                 snooze()
//!   Idle ─────────────► Alarm ─────────────────► Snooze
//!    ▲                  │  ▲                        │
//!    │     cancel()     │  │  tick, now > until     │
//!    └──────────────────┘  └────────────────────────┘
//!    ▲                                              │
//!    └──────────────────── cancel() ────────────────┘
//! ```
//!
//! Alarms are global: any subsystem may raise one regardless of the active
//! mode. Causes accumulate in a deduplicated message set until cancelled.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use washwatch_protocol::{AlarmDesired, DesiredAlarmState};

use super::dirty::{Dirty, DirtyFlag};

/// Alarm machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmStatus {
    /// Quiet
    #[default]
    Idle,
    /// Sounding
    Alarm,
    /// Silenced until a deadline
    Snooze,
}

impl AlarmStatus {
    /// Name as shown on screen and in the shadow
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmStatus::Idle => "Idle",
            AlarmStatus::Alarm => "Alarm",
            AlarmStatus::Snooze => "Snooze",
        }
    }
}

/// Reasons an inbound delta is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeltaError {
    /// `Snooze` requested without a `snooze_until`
    #[error("snooze requested without snooze_until")]
    MissingSnoozeUntil,
    /// `snooze_until` is not in the future
    #[error("snooze_until is not in the future")]
    SnoozeInPast,
}

/// Reported alarm section
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmSummary {
    /// Current state
    pub state: AlarmStatus,
    /// Active causes, sorted
    pub messages: Vec<String>,
    /// Snooze deadline in device clock seconds
    pub snooze_until_s: Option<f64>,
}

/// Alarm state holder
#[derive(Debug, Clone)]
pub struct AlarmState {
    status: AlarmStatus,
    messages: BTreeSet<String>,
    snooze_until_ms: Option<u64>,
    default_snooze_ms: u64,
    dirty: DirtyFlag,
}

impl AlarmState {
    /// Create an idle alarm with the given default snooze length
    pub fn new(default_snooze_ms: u64) -> Self {
        Self {
            status: AlarmStatus::Idle,
            messages: BTreeSet::new(),
            snooze_until_ms: None,
            default_snooze_ms,
            dirty: DirtyFlag::new(),
        }
    }

    /// Current state
    pub fn status(&self) -> AlarmStatus {
        self.status
    }

    /// Check if the alarm is sounding
    pub fn is_sounding(&self) -> bool {
        self.status == AlarmStatus::Alarm
    }

    /// Active causes, in sorted order
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// Check whether a cause is active
    pub fn has_message(&self, message: &str) -> bool {
        self.messages.contains(message)
    }

    /// Snooze deadline (ms)
    pub fn snooze_until_ms(&self) -> Option<u64> {
        self.snooze_until_ms
    }

    /// Raise the alarm, optionally recording a cause
    pub fn alarm(&mut self, message: Option<&str>) {
        if let Some(message) = message {
            if !self.messages.contains(message) {
                self.messages.insert(String::from(message));
            }
        }
        if self.status != AlarmStatus::Alarm {
            info!("alarm raised");
        }
        self.status = AlarmStatus::Alarm;
        self.snooze_until_ms = None;
        self.dirty.mark();
    }

    /// Silence a sounding alarm for `duration_ms`
    ///
    /// Does nothing unless the alarm is currently sounding.
    pub fn snooze(&mut self, now_ms: u64, duration_ms: u64) {
        if self.status != AlarmStatus::Alarm {
            return;
        }
        debug!("alarm snoozed for {} ms", duration_ms);
        self.status = AlarmStatus::Snooze;
        self.snooze_until_ms = Some(now_ms + duration_ms);
        self.dirty.mark();
    }

    /// Snooze for the configured default duration
    pub fn snooze_default(&mut self, now_ms: u64) {
        self.snooze(now_ms, self.default_snooze_ms);
    }

    /// Clear the alarm and all causes
    pub fn cancel(&mut self) {
        self.status = AlarmStatus::Idle;
        self.messages.clear();
        self.snooze_until_ms = None;
        self.dirty.mark();
    }

    /// Periodic update: re-raise once the snooze deadline has passed
    pub fn tick(&mut self, now_ms: u64) {
        if self.status != AlarmStatus::Snooze {
            return;
        }
        if let Some(until) = self.snooze_until_ms {
            if now_ms > until {
                info!("snooze expired, alarm re-raised");
                self.status = AlarmStatus::Alarm;
                self.snooze_until_ms = None;
                self.dirty.mark();
            }
        }
    }

    /// Apply a remote desired state
    ///
    /// The request is validated before anything changes, so a rejected
    /// delta leaves the alarm untouched.
    pub fn handle_delta(&mut self, now_ms: u64, desired: &AlarmDesired) -> Result<(), DeltaError> {
        let snooze_ms = match desired.state {
            Some(DesiredAlarmState::Snooze) => {
                let until_s = desired.snooze_until.ok_or(DeltaError::MissingSnoozeUntil)?;
                let until_ms = seconds_to_ms(until_s);
                if until_ms <= now_ms {
                    return Err(DeltaError::SnoozeInPast);
                }
                Some(until_ms - now_ms)
            }
            _ => None,
        };

        if let Some(messages) = &desired.messages {
            let replacement: BTreeSet<String> = messages.iter().cloned().collect();
            if replacement != self.messages {
                self.messages = replacement;
                self.dirty.mark();
            }
        }

        match (desired.state, snooze_ms) {
            (Some(DesiredAlarmState::Idle), _) => self.cancel(),
            (Some(DesiredAlarmState::Alarm), _) => self.alarm(None),
            (Some(DesiredAlarmState::Snooze), Some(duration_ms)) => self.snooze(now_ms, duration_ms),
            _ => {}
        }

        Ok(())
    }

    /// Reported section
    pub fn summary(&self) -> AlarmSummary {
        AlarmSummary {
            state: self.status,
            messages: self.messages.iter().cloned().collect(),
            snooze_until_s: self.snooze_until_ms.map(|ms| ms as f64 / 1000.0),
        }
    }
}

impl Dirty for AlarmState {
    fn mark(&mut self) {
        self.dirty.mark();
    }

    fn take_changed(&mut self) -> bool {
        self.dirty.take_changed()
    }
}

/// Convert a device-clock timestamp in seconds to milliseconds
fn seconds_to_ms(seconds: f64) -> u64 {
    if seconds <= 0.0 {
        0
    } else {
        (seconds * 1000.0) as u64
    }
}
