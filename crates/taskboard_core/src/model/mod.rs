mod task;

pub use task::{Task, TaskId, TaskPhase, Timestamp};
