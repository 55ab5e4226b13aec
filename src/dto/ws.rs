use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dto::app_state::TitleRequest,
    state::{
        ClientRole,
        event::{AwardId, GuestId, Mutation, NomineeId, ScreenMode},
        fact::Fact,
    },
};

/// Query string accepted by `/ws`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WsQuery {
    /// Declared client role; defaults to `display`.
    #[serde(default)]
    pub role: Option<ClientRole>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
/// Actions accepted from WebSocket clients.
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClientAction {
    /// Stop guests from changing predictions.
    LockPredictions,
    /// Let guests change predictions again.
    UnlockPredictions,
    /// Declare the winner of an award.
    SelectWinner {
        /// Award concerned.
        award_id: AwardId,
        /// Winning nominee.
        nominee_id: NomineeId,
    },
    /// Withdraw the winner of an award.
    ClearWinner {
        /// Award concerned.
        award_id: AwardId,
    },
    /// Show the logo on the public display.
    ShowLogo,
    /// Show one award on the public display.
    ShowAward {
        /// Award concerned.
        award_id: AwardId,
    },
    /// Show the scoreboard on the public display.
    ShowScoreboard,
    /// A guest saved predictions; relayed without touching the state.
    GuestSubmitted {
        /// Roster position of the guest.
        guest_id: GuestId,
        /// Name shown on the admin screen.
        guest_name: String,
    },
    /// The guest roster changed on disk.
    GuestsUpdated,
    /// The room roster changed on disk.
    RoomsUpdated,
    /// Rename the event.
    SetEventTitle {
        /// New event name.
        title: String,
    },
    /// Return to a fresh event keeping its title.
    ResetState,
    /// Keep-alive; answered with a pong to the sender only.
    Ping,
    /// Any unrecognised `kind`; ignored.
    #[serde(other)]
    Unknown,
}

/// What the relay does with one inbound action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Persist the mutation, then broadcast its fact.
    Mutate(Mutation),
    /// Broadcast the fact without touching the state.
    Signal(Fact),
    /// Answer the sender only.
    Pong,
    /// Refuse the action and tell the sender why.
    Reject {
        /// Action name as sent by the client.
        action: &'static str,
        /// Reason shown to the sender.
        message: String,
    },
    /// Drop the action silently.
    Ignore,
}

impl ClientAction {
    /// Translate the action into at most one store mutation.
    pub fn into_dispatch(self) -> Dispatch {
        match self {
            Self::LockPredictions => Dispatch::Mutate(Mutation::SetLock(true)),
            Self::UnlockPredictions => Dispatch::Mutate(Mutation::SetLock(false)),
            Self::SelectWinner {
                award_id,
                nominee_id,
            } => Dispatch::Mutate(Mutation::SetWinner {
                award_id,
                nominee_id,
            }),
            Self::ClearWinner { award_id } => Dispatch::Mutate(Mutation::ClearWinner { award_id }),
            Self::ShowLogo => Dispatch::Mutate(Mutation::SetScreen(ScreenMode::Logo)),
            Self::ShowAward { award_id } => {
                Dispatch::Mutate(Mutation::SetScreen(ScreenMode::Award { award_id }))
            }
            Self::ShowScoreboard => Dispatch::Mutate(Mutation::SetScreen(ScreenMode::Scoreboard)),
            Self::GuestSubmitted {
                guest_id,
                guest_name,
            } => Dispatch::Signal(Fact::GuestSubmitted {
                guest_id,
                guest_name,
            }),
            Self::GuestsUpdated => Dispatch::Signal(Fact::GuestsUpdated),
            Self::RoomsUpdated => Dispatch::Signal(Fact::RoomsUpdated),
            Self::SetEventTitle { title } => {
                let request = TitleRequest { title };
                match request.validate() {
                    Ok(()) => Dispatch::Mutate(Mutation::SetEventTitle(request.title)),
                    Err(err) => Dispatch::Reject {
                        action: "setEventTitle",
                        message: err.to_string(),
                    },
                }
            }
            Self::ResetState => Dispatch::Mutate(Mutation::Reset),
            Self::Ping => Dispatch::Pong,
            Self::Unknown => Dispatch::Ignore,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
/// Messages sent to the originating connection only.
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConnectionReply {
    /// Answer to a ping.
    Pong,
    /// The action was refused; nothing was applied.
    ActionFailed {
        /// Action name as sent by the client.
        action: String,
        /// Reason shown to the sender.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> ClientAction {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn decodes_tagged_actions() {
        assert_eq!(
            parse(r#"{"kind":"selectWinner","award_id":1,"nominee_id":5}"#),
            ClientAction::SelectWinner {
                award_id: 1,
                nominee_id: 5
            }
        );
        assert_eq!(parse(r#"{"kind":"showScoreboard"}"#), ClientAction::ShowScoreboard);
        assert_eq!(parse(r#"{"kind":"teleport"}"#), ClientAction::Unknown);
    }

    #[test]
    fn known_kind_with_bad_fields_is_a_decode_error() {
        assert!(serde_json::from_str::<ClientAction>(r#"{"kind":"selectWinner"}"#).is_err());
        assert!(serde_json::from_str::<ClientAction>("not json").is_err());
    }

    #[test]
    fn screen_actions_become_screen_mutations() {
        assert_eq!(
            ClientAction::ShowAward { award_id: 2 }.into_dispatch(),
            Dispatch::Mutate(Mutation::SetScreen(ScreenMode::Award { award_id: 2 }))
        );
        assert_eq!(
            ClientAction::ShowLogo.into_dispatch(),
            Dispatch::Mutate(Mutation::SetScreen(ScreenMode::Logo))
        );
    }

    #[test]
    fn roster_signals_pass_through() {
        assert_eq!(
            ClientAction::GuestSubmitted {
                guest_id: 4,
                guest_name: "Ada".into()
            }
            .into_dispatch(),
            Dispatch::Signal(Fact::GuestSubmitted {
                guest_id: 4,
                guest_name: "Ada".into()
            })
        );
        assert_eq!(ClientAction::Ping.into_dispatch(), Dispatch::Pong);
        assert_eq!(ClientAction::Unknown.into_dispatch(), Dispatch::Ignore);
    }

    #[test]
    fn blank_title_is_rejected() {
        let dispatch = ClientAction::SetEventTitle {
            title: "   ".into(),
        }
        .into_dispatch();
        assert!(matches!(
            dispatch,
            Dispatch::Reject {
                action: "setEventTitle",
                ..
            }
        ));
    }

    #[test]
    fn replies_are_tagged_like_facts() {
        let json = serde_json::to_value(ConnectionReply::ActionFailed {
            action: "lockPredictions".into(),
            message: "storage unavailable".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "actionFailed", "action": "lockPredictions", "message": "storage unavailable"})
        );
    }
}
