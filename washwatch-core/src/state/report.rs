//! Reported shadow document
//!
//! A [`ReportedState`] is a snapshot of everything the device reports, taken
//! without touching any dirty flags. It becomes the `reported` half of a
//! shadow update once converted into a [`Document`].

use alloc::vec::Vec;

use washwatch_protocol::{Document, Value};

use super::alarm::AlarmSummary;
use super::auto::AutoSummary;
use super::manual::ManualSummary;
use super::store::Mode;

/// Snapshot of the reported state
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedState {
    /// Device clock (s)
    pub now_s: f64,
    /// Active mode
    pub mode: Mode,
    /// Automatic washer tracking
    pub auto: AutoSummary,
    /// Manual timers
    pub manual: ManualSummary,
    /// Alarm
    pub alarm: AlarmSummary,
}

impl ReportedState {
    /// Build the document tree published as `reported`
    pub fn to_document(&self) -> Document {
        Document::new()
            .with("now", self.now_s)
            .with("mode", self.mode.as_str())
            .with("auto", auto_section(&self.auto))
            .with("manual", manual_section(&self.manual))
            .with("alarm", alarm_section(&self.alarm))
    }
}

fn auto_section(auto: &AutoSummary) -> Document {
    Document::new()
        .with("washer_state", auto.washer_state.as_str())
        .with("washer_elapsed", auto.washer_elapsed.as_str())
        .with("cycle_complete", auto.signals.cycle_complete)
        .with("lid_locked", auto.signals.lid_locked)
        .with("cycle_complete_raw", auto.reading.cycle_complete_raw)
        .with("blank_raw", auto.reading.blank_raw)
        .with("lid_locked_raw", auto.reading.lid_locked_raw)
}

fn manual_section(manual: &ManualSummary) -> Document {
    Document::new()
        .with("washer_state", manual.washer_state.as_str())
        .with("washer_remaining", manual.washer_remaining.as_str())
        .with("dryer_state", manual.dryer_state.as_str())
        .with("dryer_remaining", manual.dryer_remaining.as_str())
}

fn alarm_section(alarm: &AlarmSummary) -> Document {
    let messages: Vec<Value> = alarm
        .messages
        .iter()
        .map(|m| Value::from(m.as_str()))
        .collect();

    let mut section = Document::new()
        .with("state", alarm.state.as_str())
        .with("messages", messages);
    if let Some(until) = alarm.snooze_until_s {
        section.insert("snooze_until", until);
    }
    section
}
