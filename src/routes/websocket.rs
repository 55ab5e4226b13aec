use axum::{
    Router,
    extract::{Query, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};

use crate::{dto::ws::WsQuery, services::relay_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/ws",
    tag = "relay",
    params(WsQuery),
    responses((status = 101, description = "Switching protocols to WebSocket"))
)]
/// Upgrade the HTTP connection into a relay session for the declared role.
pub async fn ws_handler(
    State(state): State<SharedState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let role = query.role.unwrap_or_default();
    ws.on_upgrade(move |socket| relay_service::handle_socket(state, socket, role))
}

/// Configure the WebSocket endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/ws", get(ws_handler))
}
