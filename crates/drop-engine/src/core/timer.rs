//! Delayed actions without blocking.
//!
//! A `Scheduler` holds fire-and-forget task records stamped with the epoch that was
//! current when they were scheduled. Games bump the epoch when a round ends; tasks
//! from an older round are dropped when they come due instead of firing into the new one.

/// A task waiting for its fire time.
#[derive(Debug, Clone, PartialEq)]
struct ScheduledTask<T> {
    /// Simulation time (seconds) at which the task becomes due.
    fire_at: f32,
    /// Epoch the task belongs to.
    epoch: u32,
    task: T,
}

/// Simulation-time task queue, advanced by the game once per fixed step.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f32,
    epoch: u32,
    pending: Vec<ScheduledTask<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            epoch: 0,
            pending: Vec::new(),
        }
    }

    /// Start a new epoch. Everything scheduled so far becomes stale.
    pub fn next_epoch(&mut self) -> u32 {
        self.epoch = self.epoch.wrapping_add(1);
        self.epoch
    }

    /// Schedule `task` to fire `delay` seconds from now, in the current epoch.
    pub fn schedule_in(&mut self, delay: f32, task: T) {
        self.pending.push(ScheduledTask {
            fire_at: self.now + delay.max(0.0),
            epoch: self.epoch,
            task,
        });
    }

    /// Advance simulation time by `dt` and return the tasks that came due, oldest first.
    /// Due tasks from a previous epoch are discarded.
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        self.now += dt;
        let now = self.now;
        let epoch = self.epoch;

        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|t| t.fire_at <= now);
        self.pending = waiting;

        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at));
        due.into_iter()
            .filter_map(|t| {
                if t.epoch == epoch {
                    Some(t.task)
                } else {
                    log::warn!(
                        "Dropping stale task from epoch {} (current epoch {})",
                        t.epoch,
                        epoch
                    );
                    None
                }
            })
            .collect()
    }

    /// Whether a task matching `pred` is waiting in the current epoch.
    pub fn is_pending(&self, pred: impl Fn(&T) -> bool) -> bool {
        self.pending
            .iter()
            .any(|t| t.epoch == self.epoch && pred(&t.task))
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
