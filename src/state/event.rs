//! The shared event record every client mirrors, and the mutations that
//! may be applied to it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::fact::Fact;

/// Identifier of an award in the catalog.
pub type AwardId = u32;
/// Identifier of a nominee, unique within the catalog.
pub type NomineeId = u32;
/// Positional identifier of a guest in the roster (1-based).
pub type GuestId = u32;

/// Title used until an operator renames the event.
pub const DEFAULT_EVENT_TITLE: &str = "Awards Night";

/// Screen currently shown on the public display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScreenMode {
    /// Idle branding screen.
    #[default]
    Logo,
    /// Nominees (and winner, once declared) for a single award.
    Award {
        /// Award being presented.
        award_id: AwardId,
    },
    /// Ranked guests with their scores.
    Scoreboard,
}

/// Authoritative shared state of the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AppState {
    /// When `true`, guests may no longer change their predictions.
    pub predictions_locked: bool,
    /// Declared winner per award; an absent key means no winner yet.
    pub winners: BTreeMap<AwardId, NomineeId>,
    /// Screen selected for the public display.
    pub active_screen: ScreenMode,
    /// Human readable event name.
    pub event_title: String,
}

impl AppState {
    /// Fresh state carrying the given title.
    pub fn with_title(event_title: impl Into<String>) -> Self {
        Self {
            predictions_locked: false,
            winners: BTreeMap::new(),
            active_screen: ScreenMode::Logo,
            event_title: event_title.into(),
        }
    }

    /// Winner declared for `award_id`, if any.
    pub fn winner_for(&self, award_id: AwardId) -> Option<NomineeId> {
        self.winners.get(&award_id).copied()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_title(DEFAULT_EVENT_TITLE)
    }
}

/// A single atomic change to [`AppState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Lock or unlock guest predictions.
    SetLock(bool),
    /// Declare (or replace) the winner of an award.
    SetWinner {
        /// Award being decided.
        award_id: AwardId,
        /// Winning nominee.
        nominee_id: NomineeId,
    },
    /// Forget the winner of an award.
    ClearWinner {
        /// Award to clear.
        award_id: AwardId,
    },
    /// Switch the public display.
    SetScreen(ScreenMode),
    /// Rename the event.
    SetEventTitle(String),
    /// Unlock predictions, clear every winner and return to the logo screen.
    /// The event title is kept.
    Reset,
}

impl Mutation {
    /// Action name used when reporting a failure back to the originator.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetLock(true) => "lockPredictions",
            Self::SetLock(false) => "unlockPredictions",
            Self::SetWinner { .. } => "selectWinner",
            Self::ClearWinner { .. } => "clearWinner",
            Self::SetScreen(ScreenMode::Logo) => "showLogo",
            Self::SetScreen(ScreenMode::Award { .. }) => "showAward",
            Self::SetScreen(ScreenMode::Scoreboard) => "showScoreboard",
            Self::SetEventTitle(_) => "setEventTitle",
            Self::Reset => "resetState",
        }
    }

    /// Apply the mutation to `state` and return the fact describing the result.
    ///
    /// The state is changed through [`Fact::apply_to`], the same reducer clients
    /// run on received facts.
    pub fn apply(self, state: &mut AppState) -> Fact {
        let fact = match self {
            Self::SetLock(locked) => Fact::LockChanged { locked },
            Self::SetWinner {
                award_id,
                nominee_id,
            } => Fact::WinnerSelected {
                award_id,
                nominee_id,
            },
            Self::ClearWinner { award_id } => Fact::WinnerCleared { award_id },
            Self::SetScreen(screen) => Fact::ScreenChanged { screen },
            Self::SetEventTitle(title) => Fact::TitleChanged { title },
            Self::Reset => Fact::StateReset {
                state: AppState::with_title(state.event_title.clone()),
            },
        };
        fact.apply_to(state);
        fact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{collection::vec, option, prelude::*};

    #[test]
    fn default_state_is_unlocked_logo_without_winners() {
        let state = AppState::default();
        assert!(!state.predictions_locked);
        assert!(state.winners.is_empty());
        assert_eq!(state.active_screen, ScreenMode::Logo);
        assert_eq!(state.event_title, DEFAULT_EVENT_TITLE);
    }

    #[test]
    fn last_winner_call_for_an_award_wins() {
        let mut state = AppState::default();
        Mutation::SetWinner {
            award_id: 1,
            nominee_id: 5,
        }
        .apply(&mut state);
        Mutation::SetWinner {
            award_id: 1,
            nominee_id: 7,
        }
        .apply(&mut state);
        assert_eq!(state.winner_for(1), Some(7));

        Mutation::ClearWinner { award_id: 1 }.apply(&mut state);
        assert_eq!(state.winner_for(1), None);

        // Clearing an award that never had a winner is a no-op.
        Mutation::ClearWinner { award_id: 3 }.apply(&mut state);
        assert!(state.winners.is_empty());
    }

    #[test]
    fn reset_keeps_title_and_clears_everything_else() {
        let mut state = AppState::with_title("Gala");
        Mutation::SetLock(true).apply(&mut state);
        Mutation::SetScreen(ScreenMode::Scoreboard).apply(&mut state);
        Mutation::SetWinner {
            award_id: 2,
            nominee_id: 9,
        }
        .apply(&mut state);

        let fact = Mutation::Reset.apply(&mut state);
        assert_eq!(state, AppState::with_title("Gala"));
        assert_eq!(
            fact,
            Fact::StateReset {
                state: AppState::with_title("Gala")
            }
        );
    }

    #[test]
    fn screen_mode_serializes_with_mode_tag() {
        let json = serde_json::to_value(ScreenMode::Award { award_id: 4 }).unwrap();
        assert_eq!(json, serde_json::json!({"mode": "award", "award_id": 4}));
        let logo: ScreenMode = serde_json::from_str(r#"{"mode":"logo"}"#).unwrap();
        assert_eq!(logo, ScreenMode::Logo);
    }

    #[test]
    fn winners_serialize_with_string_keys() {
        let mut state = AppState::default();
        state.winners.insert(1, 5);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["winners"], serde_json::json!({"1": 5}));
        let back: AppState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    proptest! {
        #[test]
        fn each_award_keeps_the_outcome_of_its_last_call(
            calls in vec((0u32..4, option::of(0u32..6)), 1..40),
        ) {
            let mut state = AppState::default();
            let mut expected = BTreeMap::new();
            for (award_id, call) in &calls {
                match call {
                    Some(nominee_id) => {
                        Mutation::SetWinner { award_id: *award_id, nominee_id: *nominee_id }
                            .apply(&mut state);
                        expected.insert(*award_id, *nominee_id);
                    }
                    None => {
                        Mutation::ClearWinner { award_id: *award_id }.apply(&mut state);
                        expected.remove(award_id);
                    }
                }
            }

            prop_assert_eq!(&state.winners, &expected);
            let (award_id, last) = calls[calls.len() - 1];
            prop_assert_eq!(state.winner_for(award_id), last);
        }
    }
}
