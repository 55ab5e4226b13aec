#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod file;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::AppStateEntity;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Durable holder of the single event-state document.
///
/// `save` must be atomic: after a crash the backend holds either the previous
/// document or the new one, never a mix of both.
pub trait AppStateStore: Send + Sync {
    /// Short backend name used in logs.
    fn backend_name(&self) -> &'static str;
    /// Read the persisted document; `None` when nothing was written yet.
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<AppStateEntity>>>;
    /// Replace the persisted document.
    fn save(&self, state: AppStateEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap liveness check used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Repair the connection in place after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
