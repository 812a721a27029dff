//! Board-agnostic core logic for the laundry monitor
//!
//! This crate contains the state-and-sync engine and nothing that depends on
//! a specific board:
//!
//! - Hardware and transport abstraction traits
//! - Signal conditioning for noisy analog indicator channels
//! - State machines for automatic cycle detection, manual timers and alarms
//! - Dirty tracking and the aggregate state store
//! - Cloud shadow synchronization with reconnect and backoff
//! - A cadence scheduler and the [`runtime::Device`] composition root
//!
//! Everything runs on one thread. The board loop calls
//! [`runtime::Device::poll`] and sleeps until the returned deadline.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

// Must come first so the logging macros are visible to the other modules
mod fmt;

pub mod config;
pub mod runtime;
pub mod scheduler;
pub mod signal;
pub mod state;
pub mod sync;
pub mod traits;
