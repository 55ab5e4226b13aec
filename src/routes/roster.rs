use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::roster::{Award, Guest, Room, RoomQuery, ScoredGuest},
    error::AppError,
    services::roster_service,
    state::{
        SharedState,
        event::{AwardId, GuestId},
    },
};

/// Read-only catalog and roster endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/awards", get(list_awards))
        .route("/api/awards/{id}", get(get_award))
        .route("/api/rooms", get(list_rooms))
        .route("/api/rooms/{code}", get(get_room))
        .route("/api/guests", get(list_guests))
        .route("/api/guests/with-scores", get(list_guests_with_scores))
        .route("/api/guests/{id}", get(get_guest))
}

/// Award catalog.
#[utoipa::path(
    get,
    path = "/api/awards",
    tag = "roster",
    responses((status = 200, description = "Awards with their nominees", body = [Award]))
)]
pub async fn list_awards(State(state): State<SharedState>) -> Result<Json<Vec<Award>>, AppError> {
    Ok(Json(roster_service::list_awards(&state).await?))
}

/// One award with its nominees.
#[utoipa::path(
    get,
    path = "/api/awards/{id}",
    tag = "roster",
    params(("id" = u32, Path, description = "Award identifier")),
    responses(
        (status = 200, description = "Award found", body = Award),
        (status = 404, description = "Unknown award")
    )
)]
pub async fn get_award(
    State(state): State<SharedState>,
    Path(id): Path<AwardId>,
) -> Result<Json<Award>, AppError> {
    Ok(Json(roster_service::get_award(&state, id).await?))
}

/// All rooms.
#[utoipa::path(
    get,
    path = "/api/rooms",
    tag = "roster",
    responses((status = 200, description = "All rooms", body = [Room]))
)]
pub async fn list_rooms(State(state): State<SharedState>) -> Result<Json<Vec<Room>>, AppError> {
    Ok(Json(roster_service::list_rooms(&state).await?))
}

/// Room by its code, ignoring case.
#[utoipa::path(
    get,
    path = "/api/rooms/{code}",
    tag = "roster",
    params(("code" = String, Path, description = "Room code, case-insensitive")),
    responses(
        (status = 200, description = "Room found", body = Room),
        (status = 404, description = "Unknown room")
    )
)]
pub async fn get_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<Room>, AppError> {
    Ok(Json(roster_service::get_room(&state, &code).await?))
}

/// Guests, optionally filtered by room.
#[utoipa::path(
    get,
    path = "/api/guests",
    tag = "roster",
    params(RoomQuery),
    responses((status = 200, description = "Guests in roster order", body = [Guest]))
)]
pub async fn list_guests(
    State(state): State<SharedState>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<Vec<Guest>>, AppError> {
    Ok(Json(
        roster_service::list_guests(&state, query.room.as_deref()).await?,
    ))
}

/// Guests with their current score, best first.
#[utoipa::path(
    get,
    path = "/api/guests/with-scores",
    tag = "roster",
    params(RoomQuery),
    responses((status = 200, description = "Ranked guests", body = [ScoredGuest]))
)]
pub async fn list_guests_with_scores(
    State(state): State<SharedState>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<Vec<ScoredGuest>>, AppError> {
    Ok(Json(
        roster_service::scoreboard(&state, query.room.as_deref()).await?,
    ))
}

/// Guest by roster position.
#[utoipa::path(
    get,
    path = "/api/guests/{id}",
    tag = "roster",
    params(("id" = u32, Path, description = "Guest position, starting at 1")),
    responses(
        (status = 200, description = "Guest found", body = Guest),
        (status = 404, description = "Unknown guest")
    )
)]
pub async fn get_guest(
    State(state): State<SharedState>,
    Path(id): Path<GuestId>,
) -> Result<Json<Guest>, AppError> {
    Ok(Json(roster_service::get_guest(&state, id).await?))
}
