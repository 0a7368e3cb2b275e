//! Common result and error types for the Segue content core.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates a fault in Segue itself (a broken invariant), never a
/// problem with authored content or a student's submission. Content problems
/// are recorded in the problem registry and the operation still returns `Ok`.
pub type SegueResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Segue, not a content or input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
