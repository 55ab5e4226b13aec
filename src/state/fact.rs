use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::event::{AppState, AwardId, GuestId, NomineeId, ScreenMode};

/// Immutable record of one completed change, fanned out to every client.
///
/// Roster signals (`guestSubmitted`, `guestsUpdated`, `roomsUpdated`) carry no
/// state of their own; they only tell listeners to re-pull the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Fact {
    /// Predictions were locked or unlocked.
    LockChanged {
        /// New lock flag.
        locked: bool,
    },
    /// A winner was declared for an award.
    WinnerSelected {
        /// Decided award.
        award_id: AwardId,
        /// Winning nominee.
        nominee_id: NomineeId,
    },
    /// The winner of an award was withdrawn.
    WinnerCleared {
        /// Award whose winner was removed.
        award_id: AwardId,
    },
    /// The public display switched screens.
    ScreenChanged {
        /// Screen now shown.
        screen: ScreenMode,
    },
    /// The event was renamed.
    TitleChanged {
        /// New title.
        title: String,
    },
    /// The state was reset; carries the complete resulting state.
    StateReset {
        /// State after the reset.
        state: AppState,
    },
    /// A guest submitted predictions.
    GuestSubmitted {
        /// Submitting guest.
        guest_id: GuestId,
        /// Display name at submission time.
        guest_name: String,
    },
    /// Guests were added, edited or removed.
    GuestsUpdated,
    /// Rooms were added or removed.
    RoomsUpdated,
}

impl Fact {
    /// Wire tag of the fact.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LockChanged { .. } => "lockChanged",
            Self::WinnerSelected { .. } => "winnerSelected",
            Self::WinnerCleared { .. } => "winnerCleared",
            Self::ScreenChanged { .. } => "screenChanged",
            Self::TitleChanged { .. } => "titleChanged",
            Self::StateReset { .. } => "stateReset",
            Self::GuestSubmitted { .. } => "guestSubmitted",
            Self::GuestsUpdated => "guestsUpdated",
            Self::RoomsUpdated => "roomsUpdated",
        }
    }

    /// Reducer shared by the store and every client replica.
    ///
    /// Applying the same fact twice leaves the state unchanged after the first
    /// application.
    pub fn apply_to(&self, state: &mut AppState) {
        match self {
            Self::LockChanged { locked } => state.predictions_locked = *locked,
            Self::WinnerSelected {
                award_id,
                nominee_id,
            } => {
                state.winners.insert(*award_id, *nominee_id);
            }
            Self::WinnerCleared { award_id } => {
                state.winners.remove(award_id);
            }
            Self::ScreenChanged { screen } => state.active_screen = screen.clone(),
            Self::TitleChanged { title } => state.event_title.clone_from(title),
            Self::StateReset { state: next } => state.clone_from(next),
            Self::GuestSubmitted { .. } | Self::GuestsUpdated | Self::RoomsUpdated => {}
        }
    }

    /// Whether derived roster data (guest lists, scores) is stale after this fact.
    pub fn invalidates_roster(&self) -> bool {
        matches!(
            self,
            Self::WinnerSelected { .. }
                | Self::WinnerCleared { .. }
                | Self::StateReset { .. }
                | Self::GuestSubmitted { .. }
                | Self::GuestsUpdated
        )
    }

    /// Whether the fact carries no state and only relays a roster signal.
    pub fn is_signal(&self) -> bool {
        matches!(
            self,
            Self::GuestSubmitted { .. } | Self::GuestsUpdated | Self::RoomsUpdated
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_facts() -> Vec<Fact> {
        vec![
            Fact::LockChanged { locked: true },
            Fact::WinnerSelected {
                award_id: 1,
                nominee_id: 5,
            },
            Fact::WinnerCleared { award_id: 2 },
            Fact::ScreenChanged {
                screen: ScreenMode::Award { award_id: 1 },
            },
            Fact::TitleChanged {
                title: "Gala".into(),
            },
            Fact::GuestsUpdated,
        ]
    }

    #[test]
    fn applying_a_fact_twice_is_idempotent() {
        for fact in sample_facts() {
            let mut once = AppState::default();
            once.winners.insert(2, 3);
            let mut twice = once.clone();

            fact.apply_to(&mut once);
            fact.apply_to(&mut twice);
            fact.apply_to(&mut twice);
            assert_eq!(once, twice, "fact {} is not idempotent", fact.kind());
        }
    }

    #[test]
    fn signals_leave_state_untouched() {
        let mut state = AppState::default();
        state.winners.insert(1, 1);
        let before = state.clone();
        for fact in [
            Fact::GuestSubmitted {
                guest_id: 3,
                guest_name: "Ada".into(),
            },
            Fact::GuestsUpdated,
            Fact::RoomsUpdated,
        ] {
            assert!(fact.is_signal());
            fact.apply_to(&mut state);
        }
        assert_eq!(state, before);
    }

    #[test]
    fn encodes_as_tagged_union() {
        let json = serde_json::to_value(Fact::WinnerSelected {
            award_id: 1,
            nominee_id: 5,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "winnerSelected", "award_id": 1, "nominee_id": 5})
        );

        let screen = serde_json::to_value(Fact::ScreenChanged {
            screen: ScreenMode::Scoreboard,
        })
        .unwrap();
        assert_eq!(
            screen,
            serde_json::json!({"kind": "screenChanged", "screen": {"mode": "scoreboard"}})
        );

        let signal: Fact = serde_json::from_str(r#"{"kind":"roomsUpdated"}"#).unwrap();
        assert_eq!(signal, Fact::RoomsUpdated);
    }

    #[test]
    fn kind_matches_serialized_tag() {
        for fact in sample_facts() {
            let json = serde_json::to_value(&fact).unwrap();
            assert_eq!(json["kind"], fact.kind());
        }
    }

    #[test]
    fn lock_and_screen_changes_do_not_invalidate_roster() {
        assert!(!Fact::LockChanged { locked: true }.invalidates_roster());
        assert!(!Fact::RoomsUpdated.invalidates_roster());
        assert!(Fact::WinnerCleared { award_id: 1 }.invalidates_roster());
    }
}
