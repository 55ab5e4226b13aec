use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::{
    dao::models::{AwardEntity, GuestEntity, NomineeEntity, RoomEntity},
    state::event::{AwardId, GuestId, NomineeId},
};

/// Optional room filter for guest listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoomQuery {
    /// Room code; matched case-insensitively.
    pub room: Option<String>,
}

/// Nominee competing for an award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Nominee {
    /// Identifier unique within its award.
    pub id: NomineeId,
    /// Display name.
    pub name: String,
    /// Image path or URL; may be empty.
    pub image: String,
}

impl From<NomineeEntity> for Nominee {
    fn from(value: NomineeEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            image: value.image,
        }
    }
}

/// Award category with its nominees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Award {
    /// Award identifier.
    pub id: AwardId,
    /// Display name.
    pub name: String,
    /// Nominees in catalog order.
    pub nominees: Vec<Nominee>,
}

impl From<AwardEntity> for Award {
    fn from(value: AwardEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            nominees: value.nominees.into_iter().map(Into::into).collect(),
        }
    }
}

/// Room grouping guests, addressed by its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Room {
    /// Position in the roster, starting at 1.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Short code guests join with.
    pub code: String,
}

impl Room {
    /// Build the DTO for the room at roster position `id`.
    pub fn from_entity(id: u32, value: RoomEntity) -> Self {
        Self {
            id,
            name: value.name,
            code: value.code,
        }
    }
}

/// Roster entry of a guest; read-only from the live engine's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Guest {
    /// Position in the roster, starting at 1.
    pub id: GuestId,
    /// Display name.
    pub name: String,
    /// Photo path or URL; may be empty.
    pub photo: String,
    /// Predicted nominee per award.
    pub predictions: BTreeMap<AwardId, NomineeId>,
    /// Codes of the rooms the guest belongs to.
    pub rooms: Vec<String>,
}

impl Guest {
    /// Build the DTO for the guest at roster position `id`, dropping unreadable predictions.
    pub fn from_entity(id: GuestId, value: GuestEntity) -> Self {
        let predictions = value
            .predictions
            .into_iter()
            .filter_map(|(key, nominee_id)| match key.parse::<AwardId>() {
                Ok(award_id) => Some((award_id, nominee_id)),
                Err(_) => {
                    warn!(guest_id = id, key = %key, "ignoring prediction with a non-numeric award id");
                    None
                }
            })
            .collect();
        Self {
            id,
            name: value.name,
            photo: value.photo,
            predictions,
            rooms: value.rooms,
        }
    }

    /// Case-insensitive room membership.
    pub fn in_room(&self, code: &str) -> bool {
        self.rooms.iter().any(|room| room.eq_ignore_ascii_case(code))
    }
}

/// Guest with the number of correctly predicted winners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoredGuest {
    /// Roster entry of the guest.
    #[serde(flatten)]
    pub guest: Guest,
    /// Predictions matching a declared winner.
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scored_guest_is_flat_on_the_wire() {
        let guest = Guest::from_entity(
            2,
            GuestEntity {
                name: "Ada".into(),
                photo: String::new(),
                predictions: BTreeMap::from([("1".to_owned(), 5)]),
                rooms: vec!["Salon".into()],
            },
        );
        assert!(guest.in_room("salon"));
        assert!(!guest.in_room("terrace"));

        let json = serde_json::to_value(ScoredGuest { guest, score: 1 }).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["score"], 1);
        assert_eq!(json["predictions"], serde_json::json!({"1": 5}));
    }
}
