use serde::{Deserialize, Serialize};

use crate::dao::models::AppStateEntity;

/// Identifier of the single state document.
pub const STATE_DOC_ID: &str = "app_state";

/// The state document with its CouchDB bookkeeping fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchStateDocument {
    /// Always [`STATE_DOC_ID`].
    #[serde(rename = "_id")]
    pub id: String,
    /// Revision to update; absent on first write.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Persisted state fields.
    #[serde(flatten)]
    pub state: AppStateEntity,
}

impl From<(AppStateEntity, Option<String>)> for CouchStateDocument {
    fn from((state, rev): (AppStateEntity, Option<String>)) -> Self {
        Self {
            id: STATE_DOC_ID.to_owned(),
            rev,
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_flattens_state_next_to_couch_metadata() {
        let raw = r#"{"_id":"app_state","_rev":"3-abc","predictions_locked":true,"winners":{"1":2}}"#;
        let doc: CouchStateDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.rev.as_deref(), Some("3-abc"));
        assert!(doc.state.predictions_locked);
        assert_eq!(doc.state.winners.get("1"), Some(&2));

        let fresh = CouchStateDocument::from((doc.state, None));
        let json = serde_json::to_value(&fresh).unwrap();
        assert_eq!(json["_id"], STATE_DOC_ID);
        assert!(json.get("_rev").is_none());
    }
}
