pub mod file;
#[cfg(test)]
pub mod memory;

use crate::dao::models::{AwardEntity, GuestEntity, RoomEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Read access to the catalog and guest roster maintained by the setup tooling.
///
/// Lists are returned in storage order; positional ids derive from it.
pub trait RosterStore: Send + Sync {
    /// Award catalog with nominees.
    fn list_awards(&self) -> BoxFuture<'static, StorageResult<Vec<AwardEntity>>>;
    /// Guest roster.
    fn list_guests(&self) -> BoxFuture<'static, StorageResult<Vec<GuestEntity>>>;
    /// Room roster.
    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>>;
}
