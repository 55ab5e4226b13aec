//! Failures of the CouchDB state backend.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for the CouchDB backend.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Request the backend was making when CouchDB failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouchStep {
    /// Checking that the database exists.
    CheckDatabase,
    /// Creating the database on first use.
    CreateDatabase,
    /// Reading the state document.
    ReadState,
    /// Writing the state document.
    WriteState,
}

impl fmt::Display for CouchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CheckDatabase => "checking the database",
            Self::CreateDatabase => "creating the database",
            Self::ReadState => "reading the state document",
            Self::WriteState => "writing the state document",
        })
    }
}

/// Failures that can occur while keeping the state document in CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// `COUCH_BASE_URL` is not set.
    #[error("CouchDB backend selected but `{var}` is not set")]
    Unconfigured {
        /// Missing variable.
        var: &'static str,
    },
    /// The HTTP client could not be built.
    #[error("failed to build CouchDB client")]
    Client(#[source] reqwest::Error),
    /// The request never got an answer.
    #[error("CouchDB unreachable while {step} in `{database}`")]
    Transport {
        /// Request in flight.
        step: CouchStep,
        /// Database holding the state document.
        database: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB answered with a status the backend does not handle.
    #[error("CouchDB answered {status} while {step} in `{database}`")]
    Status {
        /// Request in flight.
        step: CouchStep,
        /// Database holding the state document.
        database: String,
        /// Status returned.
        status: StatusCode,
    },
    /// Another writer replaced the document between our read and write.
    #[error("state document in `{database}` was replaced concurrently")]
    Conflict {
        /// Database holding the state document.
        database: String,
    },
    /// The stored document does not match the state layout.
    #[error("state document in `{database}` could not be decoded")]
    Decode {
        /// Database holding the state document.
        database: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },
}
