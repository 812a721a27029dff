//! Fixed-period task cadences

use heapless::Vec;

use crate::config::ScheduleConfig;

/// Number of periodic tasks
pub const TASK_COUNT: usize = 5;

/// A periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Task {
    /// Free-heap sampler
    Memory,
    /// Sensor sampling and cycle detection
    Sensors,
    /// Manual timers
    Timers,
    /// Alarm/snooze
    Alarm,
    /// Shadow sync
    Sync,
}

impl Task {
    /// Order in which due tasks run within one pass
    pub const PASS_ORDER: [Task; TASK_COUNT] = [
        Task::Memory,
        Task::Sensors,
        Task::Timers,
        Task::Alarm,
        Task::Sync,
    ];

    fn index(self) -> usize {
        match self {
            Task::Memory => 0,
            Task::Sensors => 1,
            Task::Timers => 2,
            Task::Alarm => 3,
            Task::Sync => 4,
        }
    }
}

/// One task's period and next due time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cadence {
    /// Period (ms)
    pub period_ms: u64,
    /// Next due time (ms)
    pub next_due_ms: u64,
}

impl Cadence {
    /// Create a cadence that is due immediately
    pub const fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            next_due_ms: 0,
        }
    }

    /// Check whether the task should run
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_due_ms
    }

    /// Mark the task as run and schedule the next slot
    ///
    /// Slots missed while the loop was late are skipped, not replayed.
    pub fn fire(&mut self, now_ms: u64) {
        if self.period_ms == 0 {
            self.next_due_ms = now_ms;
            return;
        }
        let missed = now_ms.saturating_sub(self.next_due_ms) / self.period_ms;
        self.next_due_ms += (missed + 1) * self.period_ms;
    }
}

/// Cadences for every periodic task
#[derive(Debug, Clone)]
pub struct Schedule {
    cadences: [Cadence; TASK_COUNT],
}

impl Schedule {
    /// Build the schedule from configured periods
    pub fn new(config: &ScheduleConfig) -> Self {
        Self {
            cadences: [
                Cadence::new(config.memory_ms),
                Cadence::new(config.sensor_ms),
                Cadence::new(config.timer_ms),
                Cadence::new(config.alarm_ms),
                Cadence::new(config.sync_ms),
            ],
        }
    }

    /// Borrow one task's cadence
    pub fn cadence(&self, task: Task) -> &Cadence {
        &self.cadences[task.index()]
    }

    /// Collect every due task in pass order, marking each as run
    pub fn due(&mut self, now_ms: u64) -> Vec<Task, TASK_COUNT> {
        let mut due = Vec::new();
        for task in Task::PASS_ORDER {
            let cadence = &mut self.cadences[task.index()];
            if cadence.is_due(now_ms) {
                cadence.fire(now_ms);
                // Capacity equals the task count
                let _ = due.push(task);
            }
        }
        due
    }

    /// Earliest upcoming due time (ms)
    pub fn next_deadline_ms(&self) -> u64 {
        self.cadences
            .iter()
            .map(|c| c.next_due_ms)
            .min()
            .unwrap_or(0)
    }
}
