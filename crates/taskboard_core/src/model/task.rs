use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const ID_PREFIX: &str = "task-";

/// Identifier of a task within the board.
///
/// New tasks get `task-<n>` keys. Lists written by older versions of the
/// widget carry plain JSON numbers; those are kept as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Key(String),
    Legacy(serde_json::Number),
}

impl TaskId {
    pub fn from_counter(counter: u64) -> Self {
        Self::Key(format!("{ID_PREFIX}{counter}"))
    }

    /// The `n` of a `task-<n>` key, if this id is one.
    pub fn counter(&self) -> Option<u64> {
        match self {
            Self::Key(key) => key.strip_prefix(ID_PREFIX)?.parse().ok(),
            Self::Legacy(_) => None,
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Key(key) => key == text,
            Self::Legacy(number) => number.to_string() == text,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Legacy(number) => write!(f, "{number}"),
        }
    }
}

/// A point in time as it was persisted.
///
/// Only ever displayed or used to re-derive hide deadlines, so anything JSON
/// produced for a date is accepted: RFC 3339 text or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Text(String),
    EpochMillis(serde_json::Number),
}

impl Timestamp {
    pub fn from_datetime(value: OffsetDateTime) -> Result<Self, AppError> {
        let text = value
            .format(&Rfc3339)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        Ok(Self::Text(text))
    }

    pub fn to_datetime(&self) -> Option<OffsetDateTime> {
        match self {
            Self::Text(text) => OffsetDateTime::parse(text, &Rfc3339).ok(),
            Self::EpochMillis(number) => {
                let millis = number.as_i64()?;
                OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
            }
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::EpochMillis(number) => write!(f, "{number}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(rename = "timestamp")]
    pub created_at: Timestamp,
    #[serde(rename = "finished", default)]
    pub completed: bool,
    #[serde(rename = "uuid")]
    pub id: TaskId,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    #[serde(
        rename = "completedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<Timestamp>,
}

fn visible_by_default() -> bool {
    true
}

/// Where a task sits in its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    Active,
    Completed,
    Hidden,
}

impl Task {
    pub fn new(id: TaskId, name: &str, created_at: Timestamp) -> Self {
        Self {
            name: name.to_string(),
            created_at,
            completed: false,
            id,
            visible: true,
            completed_at: None,
        }
    }

    pub fn phase(&self) -> TaskPhase {
        match (self.completed, self.visible) {
            (false, _) => TaskPhase::Active,
            (true, true) => TaskPhase::Completed,
            (true, false) => TaskPhase::Hidden,
        }
    }
}
