//! Cloud shadow wire protocol
//!
//! This crate defines everything that crosses the pub/sub transport between
//! the laundry monitor and the cloud-held shadow document:
//!
//! - Topic naming for the `update` and `update/delta` channels
//! - The ordered [`Document`] tree that reported state is rendered into
//! - Structural diffing of two documents into a minimal [`Patch`]
//! - Encoding of outbound update envelopes and decoding of inbound deltas
//!
//! # Envelope Overview
//!
//! ```text
//! device ──► $aws/things/<id>/shadow/update
//!            {"state": {"reported": <patch>, "desired": <ack>?}}
//!
//! cloud  ──► $aws/things/<id>/shadow/update/delta
//!            {"state": {"alarm": {...}}, "version": n}
//! ```
//!
//! A key mapped to `null` inside a patch deletes that key from the shadow.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod document;
pub mod messages;
pub mod topics;

pub use document::{diff, Change, Document, Patch, Value};
pub use messages::{
    decode_delta, encode_update, AlarmDesired, DecodeError, DeltaMessage, DesiredAlarmState,
    DesiredState, EncodeError,
};
pub use topics::{ShadowTopics, TopicError, MAX_TOPIC_LEN};
