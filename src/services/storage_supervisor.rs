use std::{future::Future, sync::Arc, time::Duration};

use futures::{FutureExt, future::BoxFuture};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    config::{AppConfig, StoreBackend},
    dao::{
        app_state_store::{AppStateStore, file::FileAppStateStore, memory::MemoryAppStateStore},
        storage::{StorageError, StorageResult},
    },
    state::SharedState,
};

/// Opens a fresh handle to the configured backend on every call.
pub type Connector =
    Box<dyn FnMut() -> BoxFuture<'static, StorageResult<Arc<dyn AppStateStore>>> + Send>;

/// Backoff and polling parameters of the supervisor loop.
#[derive(Debug, Clone, Copy)]
pub struct SupervisorTiming {
    /// Wait before the first reconnect attempt.
    pub initial_delay: Duration,
    /// Cap of the doubling reconnect delay.
    pub max_delay: Duration,
    /// Pause between health checks of a healthy backend.
    pub health_poll_interval: Duration,
    /// In-place reconnects tried before building a fresh backend.
    pub max_reconnect_attempts: u32,
}

impl Default for SupervisorTiming {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_secs(10),
            health_poll_interval: Duration::from_secs(5),
            max_reconnect_attempts: 3,
        }
    }
}

impl SupervisorTiming {
    fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }
}

/// Reconnect to the storage backend and keep the store in degraded mode when it is unavailable.
pub async fn run<F, Fut>(state: SharedState, connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn AppStateStore>, StorageError>> + Send,
{
    run_with_timing(state, connect, SupervisorTiming::default()).await
}

/// [`run`] with explicit timing.
pub async fn run_with_timing<F, Fut>(state: SharedState, mut connect: F, timing: SupervisorTiming)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn AppStateStore>, StorageError>> + Send,
{
    let store = state.store();
    let mut delay = timing.initial_delay;

    loop {
        let backend = match connect().await {
            Ok(backend) => backend,
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = timing.next_delay(delay);
                continue;
            }
        };

        let name = backend.backend_name();
        if let Err(err) = store.install_backend(backend.clone()).await {
            warn!(backend = name, error = %err, "failed to load persisted state; staying in degraded mode");
            sleep(delay).await;
            delay = timing.next_delay(delay);
            continue;
        }
        info!(backend = name, "storage connection established; leaving degraded mode");
        delay = timing.initial_delay;

        loop {
            match backend.health_check().await {
                Ok(()) => {
                    if store.is_degraded() {
                        info!(backend = name, "storage healthy again; leaving degraded mode");
                        store.update_degraded(false);
                    }
                    sleep(timing.health_poll_interval).await;
                }
                Err(err) => {
                    warn!(backend = name, error = %err, "storage health check failed");
                    if reconnect(&state, backend.clone(), &timing).await {
                        sleep(timing.health_poll_interval).await;
                        continue;
                    }
                    warn!(
                        backend = name,
                        "exhausted storage reconnect attempts; staying in degraded mode"
                    );
                    store.clear_backend().await;
                    break;
                }
            }
        }

        sleep(delay).await;
        delay = timing.next_delay(delay);
    }
}

/// Retry the backend a bounded number of times, reloading its snapshot on success.
async fn reconnect(
    state: &SharedState,
    backend: Arc<dyn AppStateStore>,
    timing: &SupervisorTiming,
) -> bool {
    let store = state.store();
    let name = backend.backend_name();
    let mut reconnect_delay = timing.initial_delay;

    for attempt in 0..timing.max_reconnect_attempts {
        let result = match backend.try_reconnect().await {
            Ok(()) => store.install_backend(backend.clone()).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => {
                info!(backend = name, attempt, "storage reconnection succeeded after health check failure");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        backend = name, attempt, error = %err,
                        "storage reconnect first attempt failed; entering degraded mode"
                    );
                    store.update_degraded(true);
                } else {
                    warn!(backend = name, attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(reconnect_delay).await;
                reconnect_delay = timing.next_delay(reconnect_delay);
            }
        }
    }
    false
}

/// Build the connector for the configured backend.
///
/// Backend settings are read once here; a missing variable fails startup
/// instead of looping in the supervisor.
pub async fn connector(config: &AppConfig) -> StorageResult<Connector> {
    match config.store_backend {
        StoreBackend::File => {
            let dir = config.db_dir();
            Ok(Box::new(move || {
                let dir = dir.clone();
                async move {
                    let store = FileAppStateStore::open(dir).await?;
                    Ok(Arc::new(store) as Arc<dyn AppStateStore>)
                }
                .boxed()
            }))
        }
        StoreBackend::Memory => {
            // Reconnects hand back the same document.
            let store = MemoryAppStateStore::new();
            Ok(Box::new(move || {
                let store = store.clone();
                async move { Ok(Arc::new(store) as Arc<dyn AppStateStore>) }.boxed()
            }))
        }
        #[cfg(feature = "couch-store")]
        StoreBackend::Couch => {
            use crate::dao::app_state_store::couchdb::{CouchAppStateStore, CouchConfig};

            let couch = CouchConfig::from_env()?;
            Ok(Box::new(move || {
                let couch = couch.clone();
                async move {
                    let store = CouchAppStateStore::connect(couch).await?;
                    Ok(Arc::new(store) as Arc<dyn AppStateStore>)
                }
                .boxed()
            }))
        }
        #[cfg(feature = "mongo-store")]
        StoreBackend::Mongo => {
            use crate::dao::app_state_store::mongodb::{MongoAppStateStore, MongoConfig};

            let mongo = MongoConfig::from_env().await?;
            Ok(Box::new(move || {
                let mongo = mongo.clone();
                async move {
                    let store = MongoAppStateStore::connect(mongo).await?;
                    Ok(Arc::new(store) as Arc<dyn AppStateStore>)
                }
                .boxed()
            }))
        }
        #[allow(unreachable_patterns)]
        other => Err(StorageError::NotCompiled(format!("{other:?}"))),
    }
}
