use std::collections::BTreeMap;

use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};

use crate::{
    dao::models::AppStateEntity,
    state::event::{NomineeId, ScreenMode},
};

/// Identifier of the single state document.
pub const STATE_DOC_ID: &str = "app_state";

/// The state document as stored in the `app_state` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoStateDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    predictions_locked: bool,
    #[serde(default)]
    winners: BTreeMap<String, NomineeId>,
    #[serde(default)]
    active_screen: Option<ScreenMode>,
    #[serde(default)]
    event_title: Option<String>,
    updated_at: DateTime,
}

impl From<AppStateEntity> for MongoStateDocument {
    fn from(value: AppStateEntity) -> Self {
        Self {
            id: STATE_DOC_ID.to_owned(),
            predictions_locked: value.predictions_locked,
            winners: value.winners,
            active_screen: value.active_screen,
            event_title: value.event_title,
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoStateDocument> for AppStateEntity {
    fn from(value: MongoStateDocument) -> Self {
        Self {
            predictions_locked: value.predictions_locked,
            winners: value.winners,
            active_screen: value.active_screen,
            current_award_id: None,
            event_title: value.event_title,
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Filter selecting the single state document.
pub fn state_doc_filter() -> Document {
    doc! {"_id": STATE_DOC_ID}
}
