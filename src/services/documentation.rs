use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the awards live server.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::state::get_app_state,
        crate::routes::state::set_lock,
        crate::routes::state::set_winner,
        crate::routes::state::clear_winner,
        crate::routes::state::set_screen,
        crate::routes::state::set_title,
        crate::routes::state::reset_state,
        crate::routes::roster::list_awards,
        crate::routes::roster::get_award,
        crate::routes::roster::list_rooms,
        crate::routes::roster::get_room,
        crate::routes::roster::list_guests,
        crate::routes::roster::list_guests_with_scores,
        crate::routes::roster::get_guest,
        crate::routes::sse::fact_stream,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::app_state::LockRequest,
            crate::dto::app_state::WinnerRequest,
            crate::dto::app_state::TitleRequest,
            crate::dto::roster::Award,
            crate::dto::roster::Nominee,
            crate::dto::roster::Room,
            crate::dto::roster::Guest,
            crate::dto::roster::ScoredGuest,
            crate::dto::ws::ClientAction,
            crate::dto::ws::ConnectionReply,
            crate::state::ClientRole,
            crate::state::event::AppState,
            crate::state::event::ScreenMode,
            crate::state::fact::Fact,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "state", description = "Shared event state and its mutations"),
        (name = "roster", description = "Read-only awards, rooms and guests"),
        (name = "sse", description = "Server-sent fact stream"),
        (name = "relay", description = "WebSocket relay for admin, guest and display clients"),
    )
)]
pub struct ApiDoc;
