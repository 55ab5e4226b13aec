use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Result alias for the MongoDB backend.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures of the MongoDB state backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// `MONGO_URI` is not set.
    #[error("MongoDB backend selected but `{var}` is not set")]
    Unconfigured {
        /// Missing variable.
        var: &'static str,
    },
    /// The connection string does not parse.
    #[error("invalid MongoDB connection URI")]
    InvalidUri(#[source] MongoError),
    /// Client options were rejected.
    #[error("failed to build MongoDB client")]
    Client(#[source] MongoError),
    /// The deployment did not answer a ping.
    #[error("MongoDB database `{database}` did not answer a ping")]
    Unreachable {
        /// Database holding the state document.
        database: String,
        /// Underlying error.
        #[source]
        source: MongoError,
    },
    /// Reading or upserting the state document failed.
    #[error("MongoDB failed while {action} the state document")]
    Document {
        /// Operation that failed.
        action: &'static str,
        /// Underlying error.
        #[source]
        source: MongoError,
    },
}
