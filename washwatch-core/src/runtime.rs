//! Composition root
//!
//! [`Device`] owns every collaborator and drives them from a single
//! [`poll`](Device::poll) entry point. A board loop looks like:
//!
//! ```ignore
//! let mut device = Device::new(&config, sensors, delay, heap, network)?;
//! loop {
//!     let next = device.poll(clock.now_ms())?;
//!     clock.sleep_until(next);
//! }
//! ```
//!
//! A `SyncError` out of `poll` is terminal; the board resets.

use embedded_hal::delay::DelayNs;

use crate::config::DeviceConfig;
use crate::scheduler::{Schedule, Task};
use crate::signal::{Thresholds, WasherSensors};
use crate::state::StateStore;
use crate::sync::{ConnectionStatus, ShadowSync, SyncError};
use crate::traits::{AnalogInput, HeapGauge, Network};

/// The whole monitor
pub struct Device<A, D, G, N: Network> {
    sensors: WasherSensors<A>,
    thresholds: Thresholds,
    delay: D,
    heap: G,
    store: StateStore,
    sync: ShadowSync<N>,
    schedule: Schedule,
}

impl<A, D, G, N> Device<A, D, G, N>
where
    A: AnalogInput,
    D: DelayNs,
    G: HeapGauge,
    N: Network,
{
    /// Wire up the device
    pub fn new(
        config: &DeviceConfig,
        sensors: WasherSensors<A>,
        delay: D,
        heap: G,
        network: N,
    ) -> Result<Self, SyncError> {
        let sync = ShadowSync::new(network, &config.sync)?;
        info!("device starting in {} mode", config.initial_mode.as_str());
        Ok(Self {
            sensors,
            thresholds: Thresholds::from(&config.sensor),
            delay,
            heap,
            store: StateStore::new(config),
            sync,
            schedule: Schedule::new(&config.schedule),
        })
    }

    /// Run every task that is due and return the next deadline (ms)
    pub fn poll(&mut self, now_ms: u64) -> Result<u64, SyncError> {
        for task in self.schedule.due(now_ms) {
            match task {
                Task::Memory => {
                    let free = self.heap.free_bytes();
                    self.store.sample_memory(now_ms, free);
                }
                Task::Sensors => {
                    let reading = self.sensors.sample_once(now_ms, &mut self.delay);
                    self.store.update_washer(now_ms, reading, &self.thresholds);
                }
                Task::Timers => self.store.tick_timers(now_ms),
                Task::Alarm => self.store.tick_alarm(now_ms),
                Task::Sync => self.sync.tick(now_ms, &mut self.store)?,
            }
        }
        Ok(self.schedule.next_deadline_ms())
    }

    /// Read-only state, for rendering
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Mutable state, for operator input
    pub fn store_mut(&mut self) -> &mut StateStore {
        &mut self.store
    }

    /// Connection bring-up progress, for rendering
    pub fn status(&self) -> &ConnectionStatus {
        self.sync.status()
    }

    /// The sync engine
    pub fn sync(&self) -> &ShadowSync<N> {
        &self.sync
    }
}
