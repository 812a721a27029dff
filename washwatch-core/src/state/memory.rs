//! Free-heap watermark
//!
//! Sampled often and reported as the best reading over the last window, so
//! a momentary allocation spike during a publish does not show up as a leak.

/// Rolling maximum of free-heap readings
#[derive(Debug, Clone)]
pub struct MemoryWatermark {
    window_ms: u64,
    window_start_ms: Option<u64>,
    current_max: usize,
    previous_max: Option<usize>,
}

impl MemoryWatermark {
    /// Create a sampler with the given window length
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            window_start_ms: None,
            current_max: 0,
            previous_max: None,
        }
    }

    /// Record one reading
    pub fn sample(&mut self, now_ms: u64, free_bytes: usize) {
        let start = *self.window_start_ms.get_or_insert(now_ms);
        if now_ms.saturating_sub(start) >= self.window_ms {
            self.previous_max = Some(self.current_max);
            self.current_max = 0;
            self.window_start_ms = Some(now_ms);
        }
        self.current_max = self.current_max.max(free_bytes);
    }

    /// Highest free-heap reading over the current and previous window
    ///
    /// `None` until the first sample.
    pub fn max_free(&self) -> Option<usize> {
        self.window_start_ms?;
        Some(match self.previous_max {
            Some(previous) => previous.max(self.current_max),
            None => self.current_max,
        })
    }
}
