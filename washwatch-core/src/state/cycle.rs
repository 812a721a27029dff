//! Shared cycle state and duration formatting

use alloc::string::String;
use core::fmt::Write;

/// Progress of one appliance cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleState {
    /// Nothing happening
    #[default]
    Idle,
    /// Cycle or timer in progress
    Running,
    /// Finished, waiting for the operator
    Done,
}

impl CycleState {
    /// Name as shown on screen and in the shadow
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleState::Idle => "Idle",
            CycleState::Running => "Running",
            CycleState::Done => "Done",
        }
    }

    /// Check if this is the idle state
    pub fn is_idle(&self) -> bool {
        matches!(self, CycleState::Idle)
    }
}

/// Format whole seconds as `"1h 2m 3s"`, or `"2m 3s"` under an hour
pub fn format_duration(total_s: u64) -> String {
    let mut out = String::new();
    let hours = total_s / 3600;
    let minutes = (total_s % 3600) / 60;
    let seconds = total_s % 60;

    // Writing to a String cannot fail
    let _ = if hours > 0 {
        write!(out, "{}h {}m {}s", hours, minutes, seconds)
    } else {
        write!(out, "{}m {}s", minutes, seconds)
    };
    out
}
