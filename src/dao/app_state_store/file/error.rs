//! Error types raised by the JSON file storage implementation.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Convenient result alias returning [`FileDaoError`] failures.
pub type FileResult<T> = Result<T, FileDaoError>;

/// Failures that can occur while reading or writing the state file.
#[derive(Debug, Error)]
pub enum FileDaoError {
    /// The data directory could not be created.
    #[error("failed to create data directory `{path}`")]
    CreateDir {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The data directory is missing or is not a directory.
    #[error("data directory `{path}` is not accessible")]
    Inaccessible {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The data directory was opened read-only.
    #[error("data directory `{path}` is read-only")]
    ReadOnly {
        /// File involved.
        path: PathBuf,
    },
    /// Reading the state file failed.
    #[error("failed to read `{path}`")]
    Read {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The state file does not contain a valid document.
    #[error("failed to decode `{path}`")]
    Decode {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// Encoding the document failed.
    #[error("failed to encode state document")]
    Encode {
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// Writing or syncing the temporary file failed.
    #[error("failed to write `{path}`")]
    Write {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Moving the temporary file over the state file failed.
    #[error("failed to replace `{path}`")]
    Replace {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The blocking writer task panicked or was cancelled.
    #[error("state file writer stopped")]
    WriterGone {
        /// Underlying error.
        #[source]
        source: tokio::task::JoinError,
    },
}
