use crate::error::AppError;
use crate::model::Task;
use crate::storage::Slots;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Slot key the whole task list lives under.
pub const TASKS_KEY: &str = "todo-lists";

#[derive(Debug, Serialize, Deserialize)]
struct StoredTasks {
    #[serde(default)]
    items: Vec<Task>,
}

/// Where a loaded list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Stored,
    Missing,
    Unreadable,
    Malformed,
}

#[derive(Debug, Clone)]
pub struct LoadedTasks {
    pub tasks: Vec<Task>,
    pub source: LoadSource,
}

/// Reads the task list back. Never fails: anything that is not a readable
/// `{ "items": [...] }` document degrades to an empty list.
pub fn load_tasks<S: Slots + ?Sized>(slots: &S) -> LoadedTasks {
    let content = match slots.get(TASKS_KEY) {
        Ok(Some(content)) => content,
        Ok(None) => return empty(LoadSource::Missing),
        Err(err) => {
            info!(error = %err, "task slot unreadable, starting empty");
            return empty(LoadSource::Unreadable);
        }
    };

    if content.trim().is_empty() {
        return empty(LoadSource::Missing);
    }

    match parse_tasks(&content) {
        Ok(tasks) => LoadedTasks {
            tasks,
            source: LoadSource::Stored,
        },
        Err(err) => {
            info!(error = %err, "task slot malformed, starting empty");
            empty(LoadSource::Malformed)
        }
    }
}

pub fn parse_tasks(content: &str) -> Result<Vec<Task>, AppError> {
    let stored: StoredTasks = serde_json::from_str(content)?;
    Ok(stored.items)
}

/// Overwrites the slot with a snapshot of the whole list.
pub fn save_tasks<S: Slots + ?Sized>(slots: &S, tasks: &[Task]) -> Result<(), AppError> {
    let stored = StoredTasks {
        items: tasks.to_vec(),
    };
    let content = serde_json::to_string(&stored)?;
    slots.set(TASKS_KEY, &content)
}

fn empty(source: LoadSource) -> LoadedTasks {
    LoadedTasks {
        tasks: Vec::new(),
        source,
    }
}
