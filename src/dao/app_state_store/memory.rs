use std::{
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;

use crate::dao::{
    app_state_store::AppStateStore,
    models::AppStateEntity,
    storage::{StorageError, StorageResult},
};

/// Volatile backend keeping the document in process memory.
///
/// Failure injection hooks make it the backend of choice for exercising
/// degraded-mode behaviour.
#[derive(Clone, Default)]
pub struct MemoryAppStateStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    document: Mutex<Option<AppStateEntity>>,
    failing: AtomicBool,
    save_delay_ms: AtomicU64,
    saves: AtomicU64,
}

impl MemoryAppStateStore {
    /// Empty store with nothing persisted yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already persisted document.
    pub fn with_document(document: AppStateEntity) -> Self {
        let store = Self::default();
        if let Ok(mut guard) = store.inner.document.lock() {
            *guard = Some(document);
        }
        store
    }

    /// Make every subsequent operation fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay applied to each save before it completes.
    pub fn set_save_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.inner.save_delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> u64 {
        self.inner.saves.load(Ordering::SeqCst)
    }

    /// Currently persisted document.
    pub fn document(&self) -> Option<AppStateEntity> {
        self.inner
            .document
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    fn check(&self) -> StorageResult<()> {
        if self.inner.failing.load(Ordering::SeqCst) {
            Err(StorageError::unavailable(
                "memory backend is failing".to_owned(),
                io::Error::other("injected failure"),
            ))
        } else {
            Ok(())
        }
    }

    fn poisoned() -> StorageError {
        StorageError::unavailable(
            "memory backend lock poisoned".to_owned(),
            io::Error::other("poisoned lock"),
        )
    }
}

impl AppStateStore for MemoryAppStateStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn load(&self) -> BoxFuture<'static, StorageResult<Option<AppStateEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.check()?;
            let guard = store.inner.document.lock().map_err(|_| Self::poisoned())?;
            Ok(guard.clone())
        })
    }

    fn save(&self, state: AppStateEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let delay = store.inner.save_delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            store.check()?;
            let mut guard = store.inner.document.lock().map_err(|_| Self::poisoned())?;
            *guard = Some(state);
            store.inner.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.check();
        Box::pin(async move { result })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.check();
        Box::pin(async move { result })
    }
}
