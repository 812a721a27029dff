//! Shadow update and delta messages
//!
//! - Device → cloud: `{"state": {"reported": <patch>, "desired": <ack>?}}`
//! - Cloud → device: `{"state": {"alarm": {...}}, "version": n, ...}`
//!
//! Only the documented delta fields are decoded; anything else in an inbound
//! message is ignored.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::document::Patch;

/// Errors that can occur while encoding an outbound update
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// JSON serialization failed
    #[error("failed to serialize shadow update")]
    Serialize,
}

/// Errors that can occur while decoding an inbound delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Payload is not valid UTF-8 JSON of the expected shape
    #[error("malformed delta payload")]
    Malformed,
}

#[derive(Serialize)]
struct Envelope<'a> {
    state: EnvelopeState<'a>,
}

#[derive(Serialize)]
struct EnvelopeState<'a> {
    reported: &'a Patch,
    #[serde(skip_serializing_if = "Option::is_none")]
    desired: Option<&'a Patch>,
}

/// Encode a reported patch, and optionally a desired acknowledgement,
/// into an update payload
pub fn encode_update(reported: &Patch, desired: Option<&Patch>) -> Result<Vec<u8>, EncodeError> {
    let envelope = Envelope {
        state: EnvelopeState { reported, desired },
    };
    serde_json::to_vec(&envelope).map_err(|_| EncodeError::Serialize)
}

/// Alarm state names as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DesiredAlarmState {
    Idle,
    Alarm,
    Snooze,
}

/// Requested alarm changes
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AlarmDesired {
    /// Requested alarm state
    #[serde(default)]
    pub state: Option<DesiredAlarmState>,
    /// Replacement message set
    #[serde(default)]
    pub messages: Option<Vec<String>>,
    /// Absolute snooze deadline, in device clock seconds
    #[serde(default)]
    pub snooze_until: Option<f64>,
}

/// The `state` object of a delta
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DesiredState {
    /// Alarm section
    #[serde(default)]
    pub alarm: Option<AlarmDesired>,
}

impl DesiredState {
    /// Top-level sections present in this delta
    pub fn sections(&self) -> impl Iterator<Item = &'static str> {
        self.alarm.as_ref().map(|_| "alarm").into_iter()
    }
}

/// An inbound delta message
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeltaMessage {
    /// Desired-but-not-reported state
    #[serde(default)]
    pub state: DesiredState,
    /// Shadow document version
    #[serde(default)]
    pub version: Option<u64>,
}

/// Decode a delta payload
pub fn decode_delta(payload: &[u8]) -> Result<DeltaMessage, DecodeError> {
    serde_json::from_slice(payload).map_err(|_| DecodeError::Malformed)
}
