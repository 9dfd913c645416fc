//! Error types for Kairan.

use thiserror::Error;

use crate::auth::AuthError;
use crate::board::ValidationError;

/// Common error type for Kairan.
#[derive(Error, Debug)]
pub enum KairanError {
    /// Authentication or authorization failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Invalid user input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced post does not exist.
    #[error("post {post_id} not found")]
    NotFound { post_id: i64 },

    /// No stored file under the given key.
    #[error("attachment {filename:?} not found")]
    AttachmentNotFound { filename: String },

    /// The uploaded file's extension is not on the allow-list.
    #[error("unsupported file type: {extension:?}")]
    UnsupportedType { extension: String },

    /// Persistence or filesystem failure.
    ///
    /// Errors from sqlx and std::io are converted into this variant.
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl KairanError {
    /// Check if this error means the caller has to log in first.
    pub fn requires_login(&self) -> bool {
        matches!(self, KairanError::Auth(AuthError::Unauthenticated))
    }
}

impl From<sqlx::Error> for KairanError {
    fn from(e: sqlx::Error) -> Self {
        KairanError::Storage(e.to_string())
    }
}

impl From<std::io::Error> for KairanError {
    fn from(e: std::io::Error) -> Self {
        KairanError::Storage(e.to_string())
    }
}

/// Result type alias for Kairan operations.
pub type Result<T> = std::result::Result<T, KairanError>;
