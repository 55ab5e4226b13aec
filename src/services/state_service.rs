use tracing::{info, warn};

use crate::{
    error::ServiceError,
    state::{
        SharedState,
        event::{AppState, Mutation},
        fact::Fact,
        store::Committed,
    },
};

/// Current authoritative state, served during degraded mode as well.
pub async fn snapshot(state: &SharedState) -> AppState {
    state.store().get().await
}

/// Persist a mutation and broadcast its fact to every connection.
pub async fn apply(state: &SharedState, mutation: Mutation) -> Result<Committed, ServiceError> {
    let action = mutation.name();
    let committed = state.commit(mutation).await?;
    info!(
        action,
        fact = committed.fact.kind(),
        subscribers = state.facts().subscriber_count(),
        "state change broadcast"
    );
    Ok(committed)
}

/// Relay a roster signal; the state is left untouched.
///
/// Facts that carry state only travel through [`apply`], so they are refused here.
pub fn relay_signal(state: &SharedState, fact: Fact) -> usize {
    if !fact.is_signal() {
        warn!(fact = fact.kind(), "refusing to relay a state change without a commit");
        return 0;
    }
    let kind = fact.kind();
    let reached = state.facts().publish(fact);
    info!(kind, reached, "roster signal relayed");
    reached
}
