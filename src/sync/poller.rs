use std::{sync::Arc, time::Duration};

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{error::SyncResult, source::SnapshotSource, view::ViewHandle};

/// Periodically replaces the local view with a fresh snapshot.
pub struct Poller {
    source: Arc<dyn SnapshotSource>,
    view: ViewHandle,
    interval: Duration,
}

impl Poller {
    /// Poll `source` into `view` every `interval`.
    pub fn new(source: Arc<dyn SnapshotSource>, view: ViewHandle, interval: Duration) -> Self {
        Self {
            source,
            view,
            interval,
        }
    }

    /// Pull one snapshot. On failure the view is left untouched.
    pub async fn poll_once(&self) -> SyncResult<bool> {
        let snapshot = self.source.fetch().await?;
        Ok(self.view.replace(snapshot))
    }

    /// Poll forever; failures are logged and retried at the next tick.
    pub async fn run(self) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(true) => info!("local view reconciled from snapshot"),
                Ok(false) => debug!("snapshot matches local view"),
                Err(err) => warn!(error = %err, "snapshot poll failed; keeping local view"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex};

    use futures::future::BoxFuture;

    use super::*;
    use crate::{state::event::AppState, sync::error::SyncError};

    /// Serves queued results, then repeats the last snapshot.
    struct ScriptedSource {
        script: Mutex<VecDeque<SyncResult<AppState>>>,
        fallback: AppState,
    }

    impl ScriptedSource {
        fn new(script: Vec<SyncResult<AppState>>, fallback: AppState) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fallback,
            })
        }
    }

    impl SnapshotSource for ScriptedSource {
        fn fetch(&self) -> BoxFuture<'static, SyncResult<AppState>> {
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(self.fallback.clone()));
            Box::pin(async move { next })
        }
    }

    fn locked() -> AppState {
        let mut state = AppState::default();
        state.predictions_locked = true;
        state
    }

    #[tokio::test]
    async fn failed_poll_keeps_the_view() {
        let view = ViewHandle::new();
        view.replace(AppState::default());
        let source = ScriptedSource::new(
            vec![Err(SyncError::InvalidUrl("offline".into()))],
            locked(),
        );
        let poller = Poller::new(source, view.clone(), Duration::from_millis(10));

        assert!(poller.poll_once().await.is_err());
        assert_eq!(view.current().state(), &AppState::default());

        assert!(poller.poll_once().await.unwrap());
        assert!(view.current().state().predictions_locked);
        assert!(!poller.poll_once().await.unwrap());
    }

    #[tokio::test]
    async fn running_poller_converges_after_failures() {
        let view = ViewHandle::new();
        let mut rx = view.subscribe();
        let source = ScriptedSource::new(
            vec![
                Err(SyncError::InvalidUrl("offline".into())),
                Err(SyncError::InvalidUrl("offline".into())),
            ],
            locked(),
        );
        let task = tokio::spawn(Poller::new(source, view.clone(), Duration::from_millis(5)).run());

        time::timeout(
            Duration::from_secs(2),
            rx.wait_for(|view| view.state().predictions_locked),
        )
        .await
        .unwrap()
        .unwrap();
        task.abort();
    }
}
