use std::sync::Arc;

use tracing::warn;

use super::{error::SyncResult, source::ScoreboardSource, view::ViewHandle};
use crate::dto::roster::ScoredGuest;

/// Re-pulls the scoreboard whenever the view reports stale roster data.
pub struct ScoreboardRefresher {
    source: Arc<dyn ScoreboardSource>,
    view: ViewHandle,
}

impl ScoreboardRefresher {
    /// Refresher that pulls from `source` on behalf of `view`.
    pub fn new(source: Arc<dyn ScoreboardSource>, view: ViewHandle) -> Self {
        Self { source, view }
    }

    /// Fetch the scoreboard if the view is stale; `None` when it was already fresh.
    ///
    /// The flag is cleared before the request, so a fact arriving meanwhile
    /// marks the view stale again. A failed pull leaves it stale.
    pub async fn refresh_if_stale(&self) -> SyncResult<Option<Vec<ScoredGuest>>> {
        if !self.view.current().is_roster_stale() {
            return Ok(None);
        }

        self.view.mark_roster_fresh();
        match self.source.fetch_scoreboard().await {
            Ok(scoreboard) => Ok(Some(scoreboard)),
            Err(err) => {
                warn!(error = %err, "scoreboard pull failed; roster stays stale");
                self.view.mark_roster_stale();
                Err(err)
            }
        }
    }
}
