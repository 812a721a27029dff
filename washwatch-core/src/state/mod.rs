//! Appliance state machines
//!
//! Defines what the monitor believes about the washer and dryer. Every
//! machine is explicit, finite, and driven by `tick`/`update` calls with the
//! current time; none of them sleeps or reads a clock on its own.
//!
//! ```text
//! WasherSensors ──► AutoState ──┐
//!                               ├──► AlarmState ◄── shadow delta
//! operator ──────► ManualState ─┘
//! ```
//!
//! [`StateStore`] owns all of them and decides when a report is due.

pub mod alarm;
pub mod auto;
pub mod cycle;
pub mod dirty;
pub mod manual;
pub mod memory;
pub mod report;
pub mod store;

pub use alarm::{AlarmState, AlarmStatus, AlarmSummary, DeltaError};
pub use auto::{AutoState, AutoSummary, WASHER_CYCLE_COMPLETE};
pub use cycle::{format_duration, CycleState};
pub use dirty::{Dirty, DirtyFlag};
pub use manual::{Appliance, ManualState, ManualSummary, Timer};
pub use memory::MemoryWatermark;
pub use report::ReportedState;
pub use store::{Mode, StateStore};
