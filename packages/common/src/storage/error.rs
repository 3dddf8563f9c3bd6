use thiserror::Error;

/// Errors that can occur during object storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The object key (or the URL it was derived from) is unusable.
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// The backend could not be built from the given configuration.
    #[error("storage configuration error: {0}")]
    Config(String),

    /// Obtaining credentials from the store's auth endpoint failed.
    #[error("object store authentication failed: {0}")]
    Auth(String),

    /// The store answered with a non-success status.
    #[error("object store rejected {operation} of '{key}' with status {status}: {body}")]
    Rejected {
        operation: &'static str,
        key: String,
        status: u16,
        body: String,
    },

    /// The request never produced a response.
    #[error("object store request failed: {0}")]
    Transport(String),
}

#[cfg(feature = "object-storage")]
impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(feature = "object-storage")]
impl From<s3::error::S3Error> for StorageError {
    fn from(err: s3::error::S3Error) -> Self {
        Self::Transport(err.to_string())
    }
}
