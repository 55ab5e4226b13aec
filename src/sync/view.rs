use std::sync::Arc;

use tokio::sync::watch;

use crate::state::{event::AppState, fact::Fact};

/// A client's copy of the shared state.
///
/// Changes only through received facts or snapshot pulls; the client never
/// predicts the outcome of its own actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalView {
    state: AppState,
    synced: bool,
    roster_stale: bool,
}

impl LocalView {
    /// Last known shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Whether at least one snapshot has been received.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Whether guest lists and scores must be re-pulled.
    pub fn is_roster_stale(&self) -> bool {
        self.roster_stale
    }

    /// Apply a pushed fact with the store's reducer. Returns whether the view changed.
    pub fn apply_fact(&mut self, fact: &Fact) -> bool {
        let before = self.state.clone();
        fact.apply_to(&mut self.state);
        let mut changed = before != self.state;
        if fact.invalidates_roster() && !self.roster_stale {
            self.roster_stale = true;
            changed = true;
        }
        changed
    }

    /// Overwrite the view with an authoritative snapshot. Returns whether it changed.
    pub fn replace(&mut self, snapshot: AppState) -> bool {
        let changed = !self.synced || self.state != snapshot;
        if self.state.winners != snapshot.winners {
            self.roster_stale = true;
        }
        self.state = snapshot;
        self.synced = true;
        changed
    }

    /// Record that guest lists and scores were re-pulled.
    pub fn mark_roster_fresh(&mut self) {
        self.roster_stale = false;
    }
}

/// Shared handle to a [`LocalView`]; observers are woken only on real changes.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    sender: Arc<watch::Sender<LocalView>>,
}

impl Default for ViewHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewHandle {
    /// Empty view, not yet synced.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(LocalView::default());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Apply a pushed fact; observers wake only if the view changed.
    pub fn apply_fact(&self, fact: &Fact) -> bool {
        self.sender.send_if_modified(|view| view.apply_fact(fact))
    }

    /// Install a snapshot; observers wake only if the view changed.
    pub fn replace(&self, snapshot: AppState) -> bool {
        self.sender.send_if_modified(|view| view.replace(snapshot))
    }

    /// Record a completed roster pull.
    pub fn mark_roster_fresh(&self) {
        self.sender.send_if_modified(|view| {
            let was_stale = view.roster_stale;
            view.mark_roster_fresh();
            was_stale
        });
    }

    /// Flag roster data as stale again, for instance after a failed pull.
    pub fn mark_roster_stale(&self) {
        self.sender.send_if_modified(|view| !std::mem::replace(&mut view.roster_stale, true));
    }

    /// Copy of the current view.
    pub fn current(&self) -> LocalView {
        self.sender.borrow().clone()
    }

    /// Watch the view for changes.
    pub fn subscribe(&self) -> watch::Receiver<LocalView> {
        self.sender.subscribe()
    }
}
