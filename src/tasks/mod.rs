//! Daily tasks, day-finish archiving and history queries

pub mod filter;
pub mod manager;

pub use filter::HistoryFilter;
pub use manager::{HistoryAmount, NewTask, TaskManager, TaskUpdate, MAX_STORED_TIME, RECENT_HISTORY_LIMIT};

/// Errors raised by task and history operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),

    #[error("storedTime must be between 0 and {} seconds", manager::MAX_STORED_TIME)]
    StoredTimeOutOfRange,

    #[error("task was not found")]
    NotFound,

    #[error("No filter criteria provided.")]
    NoCriteria,

    #[error("unknown filter field '{0}'")]
    UnknownField(String),

    #[error("value '{value}' cannot be used to filter '{field}'")]
    KindMismatch { field: String, value: String },

    #[error("invalid filter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
