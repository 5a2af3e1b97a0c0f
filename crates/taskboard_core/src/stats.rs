use crate::model::Task;
use serde::Serialize;

/// Summary figures shown above the list.
///
/// Both percentages round up on their own, so they can add up to more
/// than 100 (one of three done reads 34% / 67%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub completed_pct: u32,
    pub pending_pct: u32,
}

impl Stats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total,
            completed,
            completed_pct: ceil_percent(completed, total),
            pending_pct: ceil_percent(total - completed, total),
        }
    }
}

/// `ceil(part * 100 / total)`, or 0 for an empty list.
pub fn ceil_percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = part as u64 * 100;
    let total = total as u64;
    scaled.div_ceil(total) as u32
}
