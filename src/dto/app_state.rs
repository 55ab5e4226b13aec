use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::validation::validate_event_title,
    state::event::{AwardId, NomineeId},
};

/// Request body for `POST /api/app-state/lock`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LockRequest {
    /// `true` locks predictions.
    pub locked: bool,
}

/// Request body for `POST /api/app-state/winner`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct WinnerRequest {
    /// Award being decided.
    pub award_id: AwardId,
    /// Winning nominee.
    pub nominee_id: NomineeId,
}

/// Request body for `POST /api/app-state/title`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TitleRequest {
    /// New event name, 1 to 120 characters once trimmed.
    #[validate(custom(function = "validate_event_title"))]
    #[schema(min_length = 1, max_length = 120)]
    pub title: String,
}
