use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    InvalidInput(String),
    InvalidData(String),
    Io(String),
    Slot { key: String, message: String },
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    /// Failure reading or writing a named persistent slot.
    pub fn slot<K: Into<String>, M: Into<String>>(key: K, message: M) -> Self {
        Self::Slot {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
            Self::Slot { .. } => "slot_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message) => message,
            Self::InvalidData(message) => message,
            Self::Io(message) => message,
            Self::Slot { message, .. } => message,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot { key, message } => {
                write!(f, "{} - slot '{}': {}", self.code(), key, message)
            }
            _ => write!(f, "{} - {}", self.code(), self.message()),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidData(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn slot_error_names_the_key() {
        let err = AppError::slot("todo-lists", "permission denied");
        assert_eq!(err.code(), "slot_error");
        assert_eq!(err.message(), "permission denied");
        assert_eq!(
            err.to_string(),
            "slot_error - slot 'todo-lists': permission denied"
        );
    }

    #[test]
    fn json_errors_map_to_invalid_data() {
        let err: AppError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.code(), "invalid_data");
    }
}
