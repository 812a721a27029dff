//! Cooperative task scheduler
//!
//! Every component is advanced by explicit calls with the current time.
//! The schedule only decides which of those calls are due; the caller runs
//! them and then sleeps until [`Schedule::next_deadline_ms`].

pub mod cadence;

pub use cadence::{Cadence, Schedule, Task, TASK_COUNT};
