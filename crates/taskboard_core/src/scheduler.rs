use crate::model::{Task, TaskId};
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

pub const DEFAULT_HIDE_DELAY_SECS: u64 = 30;

/// Deadline used when completion time plus delay runs past the calendar.
pub const NEVER: OffsetDateTime = PrimitiveDateTime::MAX.assume_utc();

#[derive(Debug, Clone, PartialEq)]
pub struct PendingHide {
    pub task_id: TaskId,
    pub fire_at: OffsetDateTime,
}

/// One-shot hide deadlines for completed tasks.
///
/// Entries hold the task id, not a list position, so the board resolves the
/// target again when an entry fires.
#[derive(Debug, Clone)]
pub struct HideScheduler {
    delay: Duration,
    pending: Vec<PendingHide>,
}

impl HideScheduler {
    /// Negative delays are treated as zero.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: delay.max(Duration::ZERO),
            pending: Vec::new(),
        }
    }

    /// Rebuilds deadlines for tasks that were completed but not yet hidden
    /// when the list was written. Tasks without a parsable completion time
    /// get no entry and stay visible.
    pub fn rederive(delay: Duration, tasks: &[Task]) -> Self {
        let mut scheduler = Self::new(delay);
        for task in tasks {
            if !task.completed || !task.visible {
                continue;
            }
            if let Some(completed_at) = task
                .completed_at
                .as_ref()
                .and_then(|stamp| stamp.to_datetime())
            {
                scheduler.schedule(task.id.clone(), completed_at);
            }
        }
        scheduler
    }

    /// Replaces any entry already held for `task_id`.
    pub fn schedule(&mut self, task_id: TaskId, completed_at: OffsetDateTime) -> OffsetDateTime {
        let fire_at = completed_at.checked_add(self.delay).unwrap_or(NEVER);
        self.pending.retain(|entry| entry.task_id != task_id);
        self.pending.push(PendingHide { task_id, fire_at });
        fire_at
    }

    /// Removes and returns every entry due at `now`, earliest first.
    pub fn take_due(&mut self, now: OffsetDateTime) -> Vec<PendingHide> {
        let (mut due, waiting): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|entry| entry.fire_at <= now);
        self.pending = waiting;
        due.sort_by_key(|entry| entry.fire_at);
        due
    }

    /// Puts back entries taken by `take_due` whose effect could not be saved.
    pub fn requeue(&mut self, entries: Vec<PendingHide>) {
        for entry in entries {
            if !self.pending.iter().any(|pending| pending.task_id == entry.task_id) {
                self.pending.push(entry);
            }
        }
    }

    pub fn next_fire_at(&self) -> Option<OffsetDateTime> {
        self.pending.iter().map(|entry| entry.fire_at).min()
    }

    pub fn pending(&self) -> &[PendingHide] {
        &self.pending
    }
}

impl Default for HideScheduler {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_HIDE_DELAY_SECS as i64))
    }
}
