//! Error types for the task engine.

use thiserror::Error;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, TaskError>;

/// Typed failures reported by the engine. Malformed input text never panics;
/// it surfaces as one of these variants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The line does not have the checklist shape (or carries a non-task status).
    #[error("line {line} is not a task")]
    NotATask {
        /// 1-based line number.
        line: usize,
    },

    /// The task is already marked complete.
    #[error("task on line {line} is already complete")]
    AlreadyComplete {
        /// 1-based line number.
        line: usize,
    },

    /// The line number is outside the document.
    #[error("line {line} is out of range (document has {len} lines)")]
    LineOutOfRange {
        /// Requested 1-based line number.
        line: usize,
        /// Number of lines in the document.
        len: usize,
    },

    /// The identifier cannot be split into a path and a line number.
    #[error("malformed task identifier: {0}")]
    MalformedIdentifier(String),

    /// The recurrence text cannot be interpreted or yields no next date.
    #[error("unparseable recurrence: {0}")]
    UnparseableRecurrence(String),
}
