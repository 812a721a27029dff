//! Hardware and transport abstraction traits
//!
//! These traits define the interface between the state-and-sync engine
//! and the board-specific implementations that own the real peripherals.

pub mod sensor;
pub mod transport;

pub use sensor::{AnalogInput, HeapGauge};
pub use transport::{InboundMessage, Network, PubSubClient, QoS, TransportError};
