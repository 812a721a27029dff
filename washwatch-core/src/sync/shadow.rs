//! Cloud shadow synchronization
//!
//! ```text
//!          bring-up ok                 transient failure
//!   Boot ──────────────► Online ──────────────────────────► Backoff
//!    │                     ▲                                  │
//!    │ transient failure   │        retry_at reached,         │
//!    └──────► Backoff ─────┴──────── bring-up ok ◄────────────┘
//! ```
//!
//! Each [`ShadowSync::tick`] either waits out a backoff, brings the
//! connection up, or runs one steady-state step: publish if the store has
//! changed (or the heartbeat is due), then poll for one inbound delta.
//!
//! Publishes are diffs against the last document the broker accepted. The
//! baseline is dropped whenever a new session starts, so the first publish
//! after a reconnect carries the whole document.

use alloc::collections::BTreeSet;

use washwatch_protocol::{
    decode_delta, diff, encode_update, Document, EncodeError, Patch, ShadowTopics, TopicError,
};

use super::status::{ConnectionStatus, Gate};
use crate::config::{SyncConfig, MAX_CLIENT_ID_LEN};
use crate::state::StateStore;
use crate::traits::{InboundMessage, Network, PubSubClient, QoS, TransportError};

/// Errors the sync engine cannot recover from on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// Terminal transport failure
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    /// Client id does not yield usable topics
    #[error("topic: {0}")]
    Topic(#[from] TopicError),
    /// Reported document could not be encoded
    #[error("encode: {0}")]
    Encode(#[from] EncodeError),
}

/// Where the engine is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncPhase {
    /// Not yet brought up
    Boot,
    /// Session established
    Online,
    /// Waiting before the next bring-up attempt
    Backoff {
        /// Earliest retry time (ms)
        retry_at_ms: u64,
    },
}

/// Shadow sync engine
pub struct ShadowSync<N: Network> {
    network: N,
    client_id: heapless::String<MAX_CLIENT_ID_LEN>,
    topics: ShadowTopics,
    heartbeat_ms: u64,
    backoff_ms: u64,
    phase: SyncPhase,
    status: ConnectionStatus,
    client: Option<N::Client>,
    baseline: Option<Document>,
    last_published_ms: Option<u64>,
    pending_ack: BTreeSet<&'static str>,
}

impl<N: Network> ShadowSync<N> {
    /// Create an engine for the configured device
    ///
    /// Nothing touches the network until the first [`tick`](Self::tick).
    pub fn new(network: N, config: &SyncConfig) -> Result<Self, SyncError> {
        let topics = ShadowTopics::for_client(&config.client_id)?;
        Ok(Self {
            network,
            client_id: config.client_id.clone(),
            topics,
            heartbeat_ms: u64::from(config.heartbeat_s) * 1000,
            backoff_ms: u64::from(config.backoff_s) * 1000,
            phase: SyncPhase::Boot,
            status: ConnectionStatus::default(),
            client: None,
            baseline: None,
            last_published_ms: None,
            pending_ack: BTreeSet::new(),
        })
    }

    /// Bring-up progress, for display
    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Shadow topics in use
    pub fn topics(&self) -> &ShadowTopics {
        &self.topics
    }

    /// Time of the last accepted publish (ms)
    pub fn last_published_ms(&self) -> Option<u64> {
        self.last_published_ms
    }

    /// Borrow the network, e.g. to inspect a board-specific link
    pub fn network(&self) -> &N {
        &self.network
    }

    /// Run one sync step
    ///
    /// Transient transport failures are absorbed: the session is dropped
    /// and a retry is scheduled. Anything else is returned and the caller
    /// is expected to reset the device.
    pub fn tick(&mut self, now_ms: u64, store: &mut StateStore) -> Result<(), SyncError> {
        match self.phase {
            SyncPhase::Backoff { retry_at_ms } if now_ms < retry_at_ms => return Ok(()),
            SyncPhase::Online => {}
            _ => {
                if let Err(e) = self.bring_up() {
                    return self.recover(now_ms, SyncError::Transport(e));
                }
                info!("shadow sync online");
                self.phase = SyncPhase::Online;
            }
        }

        match self.step(now_ms, store) {
            Ok(()) => Ok(()),
            Err(e) => self.recover(now_ms, e),
        }
    }

    /// Open whichever gates are still closed
    fn bring_up(&mut self) -> Result<(), TransportError> {
        if !self.status.wifi {
            debug!("joining network");
            self.network.join()?;
            self.status.set(Gate::Wifi, true);
        }
        if !self.status.tls {
            debug!("loading credentials");
            self.network.load_credentials()?;
            self.status.set(Gate::Tls, true);
        }
        self.start_transport()
    }

    /// Create, connect and subscribe a fresh client
    ///
    /// Safe to call again after a failure at any point.
    fn start_transport(&mut self) -> Result<(), TransportError> {
        self.client = None;
        self.baseline = None;
        self.status.drop_session();

        let mut client = self.network.create_client(&self.client_id)?;
        self.status.set(Gate::Transport, true);

        client.connect()?;
        self.status.set(Gate::Connected, true);

        client.subscribe(&self.topics.delta)?;
        self.status.set(Gate::Subscribed, true);

        self.client = Some(client);
        // Forces a publish on the next step
        self.last_published_ms = None;
        Ok(())
    }

    fn step(&mut self, now_ms: u64, store: &mut StateStore) -> Result<(), SyncError> {
        let changed = store.should_report_now();
        let heartbeat_due = self
            .last_published_ms
            .is_none_or(|last| now_ms.saturating_sub(last) > self.heartbeat_ms);

        if changed || heartbeat_due || !self.pending_ack.is_empty() {
            self.publish(now_ms, store)?;
        }

        self.poll(now_ms, store)?;
        Ok(())
    }

    fn publish(&mut self, now_ms: u64, store: &StateStore) -> Result<(), SyncError> {
        let document = store.reported(now_ms).to_document();
        let reported = match &self.baseline {
            Some(baseline) => diff(baseline, &document),
            None => Patch::full(&document),
        };
        let ack = if self.pending_ack.is_empty() {
            None
        } else {
            Some(Patch::clearing(self.pending_ack.iter().copied()))
        };

        let payload = encode_update(&reported, ack.as_ref())?;
        let client = self.client.as_mut().ok_or(TransportError::ConnectionLost)?;
        client.publish(&self.topics.update, &payload, QoS::AtMostOnce)?;

        debug!(
            "published {} keys ({} bytes)",
            reported.len(),
            payload.len()
        );
        self.status.set(Gate::Published, true);
        self.baseline = Some(document);
        self.last_published_ms = Some(now_ms);
        self.pending_ack.clear();
        Ok(())
    }

    fn poll(&mut self, now_ms: u64, store: &mut StateStore) -> Result<(), SyncError> {
        let client = self.client.as_mut().ok_or(TransportError::ConnectionLost)?;
        if let Some(message) = client.poll_once()? {
            self.handle_message(now_ms, &message, store);
        }
        Ok(())
    }

    fn handle_message(&mut self, now_ms: u64, message: &InboundMessage, store: &mut StateStore) {
        if !self.topics.is_delta(&message.topic) {
            debug!("ignoring message on unexpected topic");
            return;
        }

        let delta = match decode_delta(&message.payload) {
            Ok(delta) => delta,
            Err(e) => {
                warn!("delta rejected: {:?}", e);
                return;
            }
        };

        self.pending_ack.extend(delta.state.sections());
        match store.handle_delta(now_ms, &delta) {
            Ok(()) => info!("delta applied"),
            Err(e) => warn!("delta rejected: {:?}", e),
        }
    }

    /// Turn a failure into a scheduled retry, or hand it to the caller
    fn recover(&mut self, now_ms: u64, error: SyncError) -> Result<(), SyncError> {
        match error {
            SyncError::Transport(e) if e.is_transient() => {
                let retry_at_ms = now_ms + self.backoff_ms;
                warn!("transport failure: {:?}, retrying in {} ms", e, self.backoff_ms);
                self.client = None;
                self.status.drop_session();
                self.phase = SyncPhase::Backoff { retry_at_ms };
                Ok(())
            }
            other => {
                error!("shadow sync stopped: {:?}", other);
                Err(other)
            }
        }
    }
}
