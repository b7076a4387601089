use thiserror::Error;
use tracing::{error, warn};

/// Error severity for UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,    // informational, nothing was lost
    Warning, // recoverable, a fallback was used
    Error,   // operation rejected
}

/// Domain-specific errors for the prompt organizer
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Invalid divider pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("Moving folder '{folder_id}' under '{parent_id}' would create a cycle")]
    FolderCycle { folder_id: String, parent_id: String },

    #[error("Parent folder '{0}' does not exist")]
    UnknownParent(String),

    #[error("Storage error for key '{key}': {message}")]
    Storage { key: String, message: String },

    #[error("Failed to serialize store data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Host failed to toggle '{id}': {message}")]
    HostToggle { id: String, message: String },
}

impl OrganizerError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidPattern { .. } => ErrorSeverity::Warning,
            Self::FolderCycle { .. } => ErrorSeverity::Error,
            Self::UnknownParent(_) => ErrorSeverity::Error,
            Self::Storage { .. } => ErrorSeverity::Warning,
            Self::Serialization(_) => ErrorSeverity::Warning,
            Self::HostToggle { .. } => ErrorSeverity::Warning,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidPattern { pattern, .. } => format!(
                "Custom divider pattern '{}' is invalid; using built-in patterns only",
                pattern
            ),
            Self::FolderCycle { .. } => "A folder cannot be moved inside itself".to_string(),
            Self::UnknownParent(id) => format!("Folder '{}' no longer exists", id),
            Self::Storage { key, .. } => {
                format!("Could not save '{}'; changes are kept for this session only", key)
            }
            Self::Serialization(e) => format!("Could not encode data: {}", e),
            Self::HostToggle { id, message } => format!("Could not toggle {}: {}", id, message),
        }
    }

    pub(crate) fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrganizerError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// ```ignore
/// use prompt_organizer::error::ResultExt;
///
/// store.write("favorites", &json).log_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
