//! Authoritative holder of the event state.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, RwLock, watch},
    time::timeout,
};
use tracing::{debug, info, warn};

use crate::dao::{
    app_state_store::AppStateStore,
    models::AppStateEntity,
    storage::{StorageError, StorageResult},
};

use super::{
    event::{AppState, AwardId, Mutation, NomineeId, ScreenMode},
    fact::Fact,
};

/// Outcome of a persisted mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    /// Fact to fan out to clients.
    pub fact: Fact,
    /// State after the mutation.
    pub state: AppState,
}

/// Single-writer store wrapping a persistence backend with an in-memory cache.
///
/// Writes are applied to a copy, persisted, and only then made visible. All of
/// them go through one FIFO gate, so two mutations never interleave.
pub struct StateStore {
    backend: RwLock<Option<Arc<dyn AppStateStore>>>,
    current: RwLock<AppState>,
    write_gate: Mutex<()>,
    degraded: watch::Sender<bool>,
    write_timeout: Duration,
    default_title: String,
}

impl StateStore {
    /// Create a store serving defaults, degraded until a backend is installed.
    pub fn new(default_title: impl Into<String>, write_timeout: Duration) -> Self {
        let default_title = default_title.into();
        let (degraded, _rx) = watch::channel(true);
        Self {
            backend: RwLock::new(None),
            current: RwLock::new(AppState::with_title(default_title.clone())),
            write_gate: Mutex::new(()),
            degraded,
            write_timeout,
            default_title,
        }
    }

    /// Last committed state. Never fails, even while degraded.
    pub async fn get(&self) -> AppState {
        self.current.read().await.clone()
    }

    /// Install a backend, adopting its persisted document or seeding it with
    /// the current state when it holds none.
    ///
    /// The document is loaded before the write gate is taken and within the
    /// write timeout, so a hanging backend never holds up queued mutations.
    pub async fn install_backend(&self, backend: Arc<dyn AppStateStore>) -> StorageResult<()> {
        let name = backend.backend_name();
        let loaded = match timeout(self.write_timeout, backend.load()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(backend = name, "loading persisted app state timed out");
                return Err(StorageError::TimedOut(self.write_timeout));
            }
        };

        let _gate = self.write_gate.lock().await;
        match loaded {
            Some(entity) => {
                let state = entity.into_state(&self.default_title);
                *self.current.write().await = state;
                info!(backend = name, "loaded persisted app state");
            }
            None => {
                let seed = AppStateEntity::from(&*self.current.read().await);
                self.persist(backend.as_ref(), seed).await?;
                info!(backend = name, "initialised app state with defaults");
            }
        }

        *self.backend.write().await = Some(backend);
        self.update_degraded(false);
        Ok(())
    }

    /// Drop the backend and enter degraded mode.
    pub async fn clear_backend(&self) {
        self.backend.write().await.take();
        self.update_degraded(true);
    }

    /// Currently installed backend, if any.
    pub async fn backend(&self) -> Option<Arc<dyn AppStateStore>> {
        self.backend.read().await.as_ref().cloned()
    }

    /// Whether mutations are currently refused.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Flip the degraded flag, notifying watchers only on change.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Apply `mutation` atomically.
    pub async fn mutate(&self, mutation: Mutation) -> StorageResult<Committed> {
        self.mutate_and(mutation, |_| {}).await
    }

    /// Apply `mutation` atomically and run `on_commit` before the next queued
    /// mutation may start, so observers see facts in commit order.
    ///
    /// On failure the previous state stays visible and `on_commit` never runs.
    pub async fn mutate_and<F>(&self, mutation: Mutation, on_commit: F) -> StorageResult<Committed>
    where
        F: FnOnce(&Committed),
    {
        let _gate = self.write_gate.lock().await;
        let backend = self.writable_backend().await?;
        let action = mutation.name();

        let mut next = self.current.read().await.clone();
        let fact = mutation.apply(&mut next);

        if let Err(err) = self
            .persist(backend.as_ref(), AppStateEntity::from(&next))
            .await
        {
            warn!(action, error = %err, "state mutation not persisted");
            return Err(err);
        }

        *self.current.write().await = next.clone();
        debug!(action, fact = fact.kind(), "state mutation committed");

        let committed = Committed { fact, state: next };
        on_commit(&committed);
        Ok(committed)
    }

    /// Lock or unlock predictions.
    pub async fn set_lock(&self, locked: bool) -> StorageResult<Committed> {
        self.mutate(Mutation::SetLock(locked)).await
    }

    /// Declare the winner of an award.
    pub async fn set_winner(
        &self,
        award_id: AwardId,
        nominee_id: NomineeId,
    ) -> StorageResult<Committed> {
        self.mutate(Mutation::SetWinner {
            award_id,
            nominee_id,
        })
        .await
    }

    /// Withdraw the winner of an award.
    pub async fn clear_winner(&self, award_id: AwardId) -> StorageResult<Committed> {
        self.mutate(Mutation::ClearWinner { award_id }).await
    }

    /// Switch the public display.
    pub async fn set_screen(&self, screen: ScreenMode) -> StorageResult<Committed> {
        self.mutate(Mutation::SetScreen(screen)).await
    }

    /// Rename the event.
    pub async fn set_event_title(&self, title: impl Into<String>) -> StorageResult<Committed> {
        self.mutate(Mutation::SetEventTitle(title.into())).await
    }

    /// Return to a fresh state keeping the title.
    pub async fn reset(&self) -> StorageResult<Committed> {
        self.mutate(Mutation::Reset).await
    }

    async fn writable_backend(&self) -> StorageResult<Arc<dyn AppStateStore>> {
        let backend = self.backend().await.ok_or(StorageError::NotInstalled)?;
        if self.is_degraded() {
            return Err(StorageError::Degraded);
        }
        Ok(backend)
    }

    async fn persist(&self, backend: &dyn AppStateStore, entity: AppStateEntity) -> StorageResult<()> {
        match timeout(self.write_timeout, backend.save(entity)).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::TimedOut(self.write_timeout)),
        }
    }
}
