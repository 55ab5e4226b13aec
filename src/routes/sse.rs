use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/facts",
    tag = "sse",
    responses((status = 200, description = "Fact stream; each event is named after the fact kind", content_type = "text/event-stream", body = String))
)]
/// Stream every committed fact to passive displays.
pub async fn fact_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe_facts(&state);
    info!("new fact SSE connection");
    sse_service::to_sse_stream(receiver)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/facts", get(fact_stream))
}
