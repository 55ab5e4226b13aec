use std::time::Duration;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;

use super::error::{SyncError, SyncResult};
use crate::{dto::roster::ScoredGuest, state::event::AppState};

/// Where a client pulls authoritative snapshots from.
pub trait SnapshotSource: Send + Sync {
    /// Pull the current event state.
    fn fetch(&self) -> BoxFuture<'static, SyncResult<AppState>>;
}

/// Where a client pulls the ranked guest list from.
pub trait ScoreboardSource: Send + Sync {
    /// Pull every guest with their current score, best first.
    fn fetch_scoreboard(&self) -> BoxFuture<'static, SyncResult<Vec<ScoredGuest>>>;
}

/// Pulls `GET /api/app-state` and `GET /api/guests/with-scores` with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSnapshotSource {
    /// Client for the server at `server_url`; every request gives up after `timeout`.
    pub fn new(server_url: &str, timeout: Duration) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SyncError::Client)?;
        Ok(Self {
            client,
            base_url: server_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Server the snapshots come from.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T>(&self, path: &str) -> BoxFuture<'static, SyncResult<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.client.clone();
        let url = format!("{}{path}", self.base_url);
        Box::pin(async move {
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|source| SyncError::Request {
                    url: url.clone(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(SyncError::Status { url, status });
            }

            response
                .json::<T>()
                .await
                .map_err(|source| SyncError::Request { url, source })
        })
    }
}

impl SnapshotSource for HttpSnapshotSource {
    fn fetch(&self) -> BoxFuture<'static, SyncResult<AppState>> {
        self.get_json("/api/app-state")
    }
}

impl ScoreboardSource for HttpSnapshotSource {
    fn fetch_scoreboard(&self) -> BoxFuture<'static, SyncResult<Vec<ScoredGuest>>> {
        self.get_json("/api/guests/with-scores")
    }
}
