use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use validator::Validate;

use crate::{
    dto::app_state::{LockRequest, TitleRequest, WinnerRequest},
    error::AppError,
    services::state_service,
    state::{
        SharedState,
        event::{AppState, AwardId, Mutation, ScreenMode},
    },
};

/// Routes reading and mutating the shared event state.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/app-state", get(get_app_state))
        .route("/api/app-state/lock", post(set_lock))
        .route("/api/app-state/winner", post(set_winner))
        .route("/api/app-state/winner/{award_id}", delete(clear_winner))
        .route("/api/app-state/screen", post(set_screen))
        .route("/api/app-state/title", post(set_title))
        .route("/api/app-state/reset", post(reset_state))
}

async fn commit(state: &SharedState, mutation: Mutation) -> Result<Json<AppState>, AppError> {
    let committed = state_service::apply(state, mutation).await?;
    Ok(Json(committed.state))
}

/// Current state; the read path of every client poller.
#[utoipa::path(
    get,
    path = "/api/app-state",
    tag = "state",
    responses((status = 200, description = "Current event state", body = AppState))
)]
pub async fn get_app_state(State(state): State<SharedState>) -> Json<AppState> {
    Json(state_service::snapshot(&state).await)
}

/// Lock or unlock guest predictions.
#[utoipa::path(
    post,
    path = "/api/app-state/lock",
    tag = "state",
    request_body = LockRequest,
    responses(
        (status = 200, description = "Predictions locked or unlocked", body = AppState),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn set_lock(
    State(state): State<SharedState>,
    Json(payload): Json<LockRequest>,
) -> Result<Json<AppState>, AppError> {
    commit(&state, Mutation::SetLock(payload.locked)).await
}

/// Declare the winner of an award, replacing any previous one.
#[utoipa::path(
    post,
    path = "/api/app-state/winner",
    tag = "state",
    request_body = WinnerRequest,
    responses(
        (status = 200, description = "Winner recorded", body = AppState),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn set_winner(
    State(state): State<SharedState>,
    Json(payload): Json<WinnerRequest>,
) -> Result<Json<AppState>, AppError> {
    commit(
        &state,
        Mutation::SetWinner {
            award_id: payload.award_id,
            nominee_id: payload.nominee_id,
        },
    )
    .await
}

/// Withdraw the winner of an award.
#[utoipa::path(
    delete,
    path = "/api/app-state/winner/{award_id}",
    tag = "state",
    params(("award_id" = u32, Path, description = "Award whose winner is withdrawn")),
    responses(
        (status = 200, description = "Winner cleared", body = AppState),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn clear_winner(
    State(state): State<SharedState>,
    Path(award_id): Path<AwardId>,
) -> Result<Json<AppState>, AppError> {
    commit(&state, Mutation::ClearWinner { award_id }).await
}

/// Switch the public display.
#[utoipa::path(
    post,
    path = "/api/app-state/screen",
    tag = "state",
    request_body = ScreenMode,
    responses(
        (status = 200, description = "Screen switched", body = AppState),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn set_screen(
    State(state): State<SharedState>,
    Json(screen): Json<ScreenMode>,
) -> Result<Json<AppState>, AppError> {
    commit(&state, Mutation::SetScreen(screen)).await
}

/// Rename the event.
#[utoipa::path(
    post,
    path = "/api/app-state/title",
    tag = "state",
    request_body = TitleRequest,
    responses(
        (status = 200, description = "Event renamed", body = AppState),
        (status = 400, description = "Title is blank or too long"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn set_title(
    State(state): State<SharedState>,
    Json(payload): Json<TitleRequest>,
) -> Result<Json<AppState>, AppError> {
    payload.validate()?;
    commit(&state, Mutation::SetEventTitle(payload.title)).await
}

/// Unlock predictions, clear all winners and return to the logo screen.
#[utoipa::path(
    post,
    path = "/api/app-state/reset",
    tag = "state",
    responses(
        (status = 200, description = "State reset", body = AppState),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn reset_state(State(state): State<SharedState>) -> Result<Json<AppState>, AppError> {
    commit(&state, Mutation::Reset).await
}
