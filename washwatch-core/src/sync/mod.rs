//! Cloud shadow synchronization
//!
//! Mirrors the [`StateStore`](crate::state::StateStore) into a cloud-held
//! shadow document and feeds desired-state deltas back into it.

pub mod shadow;
pub mod status;

pub use shadow::{ShadowSync, SyncError, SyncPhase};
pub use status::{ConnectionStatus, Gate};
