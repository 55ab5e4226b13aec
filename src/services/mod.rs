/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// WebSocket relay turning client actions into broadcast facts.
pub mod relay_service;
/// Read-only roster queries and scoreboards.
pub mod roster_service;
/// Guest score derivation.
pub mod scoring;
/// Server-Sent Events mirror of the fact stream.
pub mod sse_service;
/// State mutations and their broadcast.
pub mod state_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
