//! Error types for the to-do store and its front ends.

/// Errors raised by the task repository, settings and command handlers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing or encoding error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A task title was empty after trimming.
    #[error("Task title cannot be empty")]
    EmptyTitle,

    /// No task exists with the given ID.
    #[error("Task with ID {0} not found")]
    TaskNotFound(i64),

    /// A stored timestamp could not be decoded.
    #[error("Invalid timestamp in column {column}: {value}")]
    InvalidTimestamp {
        /// The column holding the value.
        column: &'static str,
        /// The raw stored value.
        value: String,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
