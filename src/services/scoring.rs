//! Derived guest scores.

use std::collections::BTreeMap;

use crate::{
    dto::roster::{Guest, ScoredGuest},
    state::event::{AwardId, NomineeId},
};

/// Number of awards whose declared winner matches the guest's prediction.
///
/// Awards without a winner contribute nothing, and a prediction for an award
/// or nominee that no longer exists simply never matches.
pub fn score(
    predictions: &BTreeMap<AwardId, NomineeId>,
    winners: &BTreeMap<AwardId, NomineeId>,
) -> u32 {
    let hits = predictions
        .iter()
        .filter(|(award_id, nominee_id)| winners.get(award_id) == Some(nominee_id))
        .count();
    u32::try_from(hits).unwrap_or(u32::MAX)
}

/// Score every guest and order them for the scoreboard: highest score first,
/// ties broken by name and then id.
pub fn rank(guests: Vec<Guest>, winners: &BTreeMap<AwardId, NomineeId>) -> Vec<ScoredGuest> {
    let mut scored = guests
        .into_iter()
        .map(|guest| ScoredGuest {
            score: score(&guest.predictions, winners),
            guest,
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.guest.name.cmp(&b.guest.name))
            .then_with(|| a.guest.id.cmp(&b.guest.id))
    });
    scored
}
