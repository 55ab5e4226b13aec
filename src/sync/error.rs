use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Result alias for client replicas.
pub type SyncResult<T> = Result<T, SyncError>;

/// Failures seen by a client replica; none of them touch the local view.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Server URL without an http(s) scheme.
    #[error("server url `{0}` must start with http:// or https://")]
    InvalidUrl(String),
    /// The HTTP client could not be built.
    #[error("failed to build the HTTP client")]
    Client(#[source] reqwest::Error),
    /// A pull never got an answer.
    #[error("snapshot request to {url} failed")]
    Request {
        /// Address requested.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered a pull with a non-success status.
    #[error("snapshot request to {url} returned status {status}")]
    Status {
        /// Address requested.
        url: String,
        /// Status returned by the server.
        status: reqwest::StatusCode,
    },
    /// The relay WebSocket could not be opened.
    #[error("failed to connect to relay at {url}")]
    Connect {
        /// Address requested.
        url: String,
        /// Underlying error.
        #[source]
        source: Box<tungstenite::Error>,
    },
    /// The relay WebSocket failed after connecting.
    #[error("relay connection dropped")]
    Transport(#[source] Box<tungstenite::Error>),
}
