//! Oversampling peak-hold conditioner
//!
//! Each sample is the maximum of a short burst of raw reads, so a single
//! read cannot land in a ripple trough. Samples are then folded into a
//! decaying peak envelope:
//!
//! ```text
//! value
//!   │ ●
//!   │ ●────●
//!   │      ●──────●          retained entries are non-increasing
//!   │             ●───●      from oldest to newest
//!   └──────────────────────► time
//!     ◄──── retention ────►
//! ```
//!
//! An entry is dropped when it leaves the retention window or when a newer
//! sample is at least as large, since it can never be the maximum again.

use embedded_hal::delay::DelayNs;
use heapless::Deque;

use crate::config::SensorConfig;
use crate::traits::AnalogInput;

/// Maximum envelope entries kept per channel
pub const HISTORY_CAPACITY: usize = 16;

/// A denoised analog channel
pub struct ConditionedSignal<A> {
    input: A,
    oversample: u8,
    spacing_us: u32,
    retention_ms: u64,
    /// Latest burst peak
    current: u16,
    /// `(value, timestamp_ms)` pairs, oldest first
    history: Deque<(u16, u64), HISTORY_CAPACITY>,
}

impl<A: AnalogInput> ConditionedSignal<A> {
    /// Wrap an analog channel
    pub fn new(input: A, config: &SensorConfig) -> Self {
        Self {
            input,
            oversample: config.oversample.max(1),
            spacing_us: config.sample_spacing_us,
            retention_ms: config.retention_ms,
            current: 0,
            history: Deque::new(),
        }
    }

    /// Take one burst of raw reads and return the peak
    pub fn read_peak<D: DelayNs>(&mut self, delay: &mut D) -> u16 {
        let mut peak = self.input.read();
        for _ in 1..self.oversample {
            delay.delay_us(self.spacing_us);
            peak = peak.max(self.input.read());
        }
        peak
    }

    /// Sample the channel and return the conditioned value
    pub fn sample_once<D: DelayNs>(&mut self, now_ms: u64, delay: &mut D) -> u16 {
        let peak = self.read_peak(delay);
        self.record(peak, now_ms)
    }
}

impl<A> ConditionedSignal<A> {
    /// Fold a burst peak into the envelope and return the conditioned value
    pub fn record(&mut self, peak: u16, now_ms: u64) -> u16 {
        let retention_ms = self.retention_ms;

        while let Some(&(_, t)) = self.history.front() {
            if t + retention_ms > now_ms {
                break;
            }
            self.history.pop_front();
        }

        while let Some(&(v, _)) = self.history.back() {
            if v > peak {
                break;
            }
            self.history.pop_back();
        }

        if self.history.is_full() {
            self.history.pop_front();
        }
        // Cannot fail: a slot was freed above if the deque was full
        let _ = self.history.push_back((peak, now_ms));

        self.current = peak;
        self.value(now_ms)
    }

    /// Current conditioned value without sampling
    ///
    /// Maximum of the latest peak and every envelope entry still inside
    /// the retention window.
    pub fn value(&self, now_ms: u64) -> u16 {
        self.history
            .iter()
            .filter(|(_, t)| t + self.retention_ms > now_ms)
            .map(|(v, _)| *v)
            .fold(self.current, u16::max)
    }

    /// Latest burst peak
    pub fn current(&self) -> u16 {
        self.current
    }

    /// Number of envelope entries currently held
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
