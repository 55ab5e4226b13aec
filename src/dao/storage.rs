use std::{error::Error, time::Duration};
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying technology.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend rejected or failed the operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human readable cause.
        message: String,
        /// Underlying error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// No backend is currently installed (degraded mode).
    #[error("storage unavailable: no backend installed")]
    NotInstalled,
    /// A backend is installed but failed its last health check.
    #[error("storage unavailable: backend is degraded")]
    Degraded,
    /// The configured backend was left out of this build.
    #[error("storage backend `{0}` is not compiled into this build")]
    NotCompiled(String),
    /// The backend did not answer within the configured write timeout.
    #[error("storage unavailable: operation timed out after {0:?}")]
    TimedOut(Duration),
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
