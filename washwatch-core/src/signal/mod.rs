//! Signal conditioning and cycle detection
//!
//! The washer's indicator lamps are sensed through photodiodes on analog
//! channels. The raw signal rides on mains ripple, so each channel is
//! oversampled and held through a short peak window before the three
//! channels are compared against each other.

pub mod conditioner;
pub mod detector;

pub use conditioner::{ConditionedSignal, HISTORY_CAPACITY};
pub use detector::{detect, Thresholds, WasherReading, WasherSensors, WasherSignals};
