//! Shared error taxonomy for the core.

use thiserror::Error;

/// Failures surfaced by the persistence collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store rejected a write that would break a unique index.
    /// The store is the final authority on uniqueness; the application-level
    /// pre-flight only exists to produce a friendlier error first.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: &'static str },

    /// Anything else the backend reports (connection loss, pool exhaustion,
    /// malformed stored data). Not recoverable within a request.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors produced by core operations.
///
/// `Validation` and `DuplicateSlug` are recoverable form-level errors: the
/// web layer re-renders the form with the message and answers 200.
/// `NotFound` and `Forbidden` terminate the request with the matching status
/// code. `Storage` is fatal to the request and logged.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("an entity with the slug '{slug}' already exists in this scope")]
    DuplicateSlug { slug: String },

    /// Also covers entities that exist but are invisible to the requesting
    /// user, so callers cannot probe for organisations they do not belong to.
    #[error("not found")]
    NotFound,

    #[error("insufficient role for this operation")]
    Forbidden,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether the web layer should recover this error into a form
    /// annotation instead of aborting the request.
    pub fn is_form_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::DuplicateSlug { .. })
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
