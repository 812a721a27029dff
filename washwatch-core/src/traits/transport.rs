//! Publish/subscribe transport traits
//!
//! The shadow sync engine never touches sockets or TLS directly. A board
//! provides a [`Network`] that can bring the link up and mint
//! [`PubSubClient`]s; clients are dropped and re-created on reconnect.
//!
//! All calls are expected to return promptly. `poll_once` must not block
//! waiting for traffic.

use alloc::string::String;
use alloc::vec::Vec;

/// Errors reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Wireless link is down or could not be joined
    #[error("network unavailable")]
    NetworkDown,
    /// Broker refused or reset the connection
    #[error("connection refused by broker")]
    ConnectionRefused,
    /// Established session dropped
    #[error("connection lost")]
    ConnectionLost,
    /// Operation did not complete in time
    #[error("operation timed out")]
    Timeout,
    /// Device certificate or key rejected or missing
    #[error("credentials rejected")]
    Credentials,
    /// Transport configuration is unusable (bad broker address, etc.)
    #[error("transport misconfigured")]
    Misconfigured,
}

impl TransportError {
    /// Check whether retrying after a backoff can succeed
    ///
    /// Credential and configuration faults will fail the same way on every
    /// attempt; everything else is worth retrying.
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            TransportError::Credentials | TransportError::Misconfigured
        )
    }
}

/// Delivery guarantee requested for a publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QoS {
    /// Fire and forget; shadow updates are best-effort
    #[default]
    AtMostOnce,
}

/// A message received on a subscribed topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Topic the message arrived on
    pub topic: String,
    /// Raw payload bytes
    pub payload: Vec<u8>,
}

/// A connected (or connectable) pub/sub session
pub trait PubSubClient {
    /// Open the session with the broker
    fn connect(&mut self) -> Result<(), TransportError>;

    /// Subscribe to a topic
    fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    /// Publish a payload
    fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), TransportError>;

    /// Deliver at most one queued inbound message without blocking
    ///
    /// Returns `Ok(None)` if nothing is pending.
    fn poll_once(&mut self) -> Result<Option<InboundMessage>, TransportError>;
}

/// Network link and client factory
pub trait Network {
    /// Client type produced by [`Network::create_client`]
    type Client: PubSubClient;

    /// Join the wireless network
    fn join(&mut self) -> Result<(), TransportError>;

    /// Load device certificate and key for the TLS session
    fn load_credentials(&mut self) -> Result<(), TransportError>;

    /// Construct a fresh, unconnected client
    fn create_client(&mut self, client_id: &str) -> Result<Self::Client, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(TransportError::NetworkDown.is_transient());
        assert!(TransportError::ConnectionLost.is_transient());
        assert!(TransportError::Timeout.is_transient());
        assert!(TransportError::ConnectionRefused.is_transient());
    }

    #[test]
    fn test_terminal_errors() {
        assert!(!TransportError::Credentials.is_transient());
        assert!(!TransportError::Misconfigured.is_transient());
    }

    #[test]
    fn test_default_qos() {
        assert_eq!(QoS::default(), QoS::AtMostOnce);
    }
}
