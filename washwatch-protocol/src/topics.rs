//! Shadow topic naming
//!
//! Topics are derived from the device client id and stored in fixed-capacity
//! strings so they can be built once at boot and reused by every publish.

use core::fmt::Write;

use heapless::String;

/// Maximum topic length in bytes
pub const MAX_TOPIC_LEN: usize = 128;

/// Topic prefix shared by all shadow channels
const THING_PREFIX: &str = "$aws/things/";

/// Errors that can occur while building topic names
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopicError {
    /// Client id is empty
    #[error("client id is empty")]
    EmptyClientId,
    /// Resulting topic does not fit in [`MAX_TOPIC_LEN`] bytes
    #[error("topic exceeds {} bytes", MAX_TOPIC_LEN)]
    TooLong,
}

/// The pair of topics used to talk to one device shadow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowTopics {
    /// Device → cloud reported updates
    pub update: String<MAX_TOPIC_LEN>,
    /// Cloud → device deltas
    pub delta: String<MAX_TOPIC_LEN>,
}

impl ShadowTopics {
    /// Build the shadow topics for a client id
    pub fn for_client(client_id: &str) -> Result<Self, TopicError> {
        if client_id.is_empty() {
            return Err(TopicError::EmptyClientId);
        }

        let mut update = String::new();
        write!(update, "{}{}/shadow/update", THING_PREFIX, client_id)
            .map_err(|_| TopicError::TooLong)?;

        let mut delta = String::new();
        write!(delta, "{}/delta", update).map_err(|_| TopicError::TooLong)?;

        Ok(Self { update, delta })
    }

    /// Check whether an inbound topic is this shadow's delta channel
    pub fn is_delta(&self, topic: &str) -> bool {
        self.delta.as_str() == topic
    }
}
