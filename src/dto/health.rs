use std::time::SystemTime;

use serde::Serialize;
use utoipa::ToSchema;

use super::format_system_time;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// RFC 3339 time the response was produced.
    pub timestamp: String,
    /// Number of open WebSocket connections.
    pub connections: usize,
}

impl HealthResponse {
    /// Create a health response for the given degraded flag.
    pub fn new(degraded: bool, connections: usize) -> Self {
        Self {
            status: if degraded { "degraded" } else { "ok" }.to_string(),
            timestamp: format_system_time(SystemTime::now()),
            connections,
        }
    }
}
