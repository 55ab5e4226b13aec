use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report degraded mode and the number of open connections.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.store().backend().await {
        Some(backend) => {
            if let Err(err) = backend.health_check().await {
                warn!(backend = backend.backend_name(), error = %err, "storage health check failed");
            }
        }
        None => warn!("storage unavailable (degraded mode)"),
    }

    HealthResponse::new(state.store().is_degraded(), state.connections().len())
}
