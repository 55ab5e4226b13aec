use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, time::SystemTime};
use tracing::warn;

use crate::state::event::{AppState, AwardId, NomineeId, ScreenMode};

/// Persisted form of the shared event state.
///
/// Field names follow the historical `app_state.json` layout so existing data
/// files keep loading; every field is optional on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppStateEntity {
    /// Whether predictions are locked.
    #[serde(default)]
    pub predictions_locked: bool,
    /// Winners keyed by the award id rendered as a string.
    #[serde(default)]
    pub winners: BTreeMap<String, NomineeId>,
    /// Screen on the public display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_screen: Option<ScreenMode>,
    /// Award shown on screen in files written before `active_screen` existed.
    #[serde(default, skip_serializing)]
    pub current_award_id: Option<AwardId>,
    /// Event name; blank values fall back to the default title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_title: Option<String>,
    /// Time of the write.
    #[serde(default = "unknown_update_time")]
    pub updated_at: SystemTime,
}

fn unknown_update_time() -> SystemTime {
    SystemTime::UNIX_EPOCH
}

impl AppStateEntity {
    /// Rebuild the runtime state, filling gaps with defaults.
    pub fn into_state(self, default_title: &str) -> AppState {
        let winners = self
            .winners
            .into_iter()
            .filter_map(|(key, nominee_id)| match key.parse::<AwardId>() {
                Ok(award_id) => Some((award_id, nominee_id)),
                Err(_) => {
                    warn!(key = %key, "ignoring winner with a non-numeric award id");
                    None
                }
            })
            .collect();

        let active_screen = match (self.active_screen, self.current_award_id) {
            (Some(screen), _) => screen,
            (None, Some(award_id)) => ScreenMode::Award { award_id },
            (None, None) => ScreenMode::Logo,
        };

        AppState {
            predictions_locked: self.predictions_locked,
            winners,
            active_screen,
            event_title: self
                .event_title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| default_title.to_owned()),
        }
    }
}

impl From<&AppState> for AppStateEntity {
    fn from(state: &AppState) -> Self {
        Self {
            predictions_locked: state.predictions_locked,
            winners: state
                .winners
                .iter()
                .map(|(award_id, nominee_id)| (award_id.to_string(), *nominee_id))
                .collect(),
            active_screen: Some(state.active_screen.clone()),
            current_award_id: None,
            event_title: Some(state.event_title.clone()),
            updated_at: SystemTime::now(),
        }
    }
}

/// Nominee entry of an award in `awards.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NomineeEntity {
    /// Identifier unique within its award.
    pub id: NomineeId,
    /// Display name.
    pub name: String,
    /// Image path or URL.
    #[serde(default)]
    pub image: String,
}

/// Award entry in `awards.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AwardEntity {
    /// Award identifier.
    pub id: AwardId,
    /// Display name.
    pub name: String,
    /// Nominees in catalog order.
    #[serde(default)]
    pub nominees: Vec<NomineeEntity>,
}

/// Guest record in `db/guests.json`; its id is its 1-based position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuestEntity {
    /// Display name.
    pub name: String,
    /// Photo path or URL.
    #[serde(default)]
    pub photo: String,
    /// Predicted nominee keyed by the award id rendered as a string.
    #[serde(default)]
    pub predictions: BTreeMap<String, NomineeId>,
    /// Codes of the rooms the guest belongs to.
    #[serde(default)]
    pub rooms: Vec<String>,
}

/// Room record in `db/rooms.json`; its id is its 1-based position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomEntity {
    /// Display name.
    pub name: String,
    /// Short code guests join with.
    pub code: String,
}
