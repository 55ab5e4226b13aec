use std::sync::{Arc, PoisonError, RwLock};

use futures::future::BoxFuture;

use crate::dao::{
    models::{AwardEntity, GuestEntity, RoomEntity},
    roster_store::RosterStore,
    storage::StorageResult,
};

/// Fixed roster used by service and route tests.
#[derive(Clone, Default)]
pub struct MemoryRosterStore {
    awards: Arc<RwLock<Vec<AwardEntity>>>,
    guests: Arc<RwLock<Vec<GuestEntity>>>,
    rooms: Arc<RwLock<Vec<RoomEntity>>>,
}

impl MemoryRosterStore {
    /// Roster holding the given entries.
    pub fn new(awards: Vec<AwardEntity>, guests: Vec<GuestEntity>, rooms: Vec<RoomEntity>) -> Self {
        Self {
            awards: Arc::new(RwLock::new(awards)),
            guests: Arc::new(RwLock::new(guests)),
            rooms: Arc::new(RwLock::new(rooms)),
        }
    }

    /// Replace the guest list, as an import would.
    pub fn set_guests(&self, guests: Vec<GuestEntity>) {
        *self.guests.write().unwrap_or_else(PoisonError::into_inner) = guests;
    }
}

impl RosterStore for MemoryRosterStore {
    fn list_awards(&self) -> BoxFuture<'static, StorageResult<Vec<AwardEntity>>> {
        let awards = self.awards.read().unwrap_or_else(PoisonError::into_inner).clone();
        Box::pin(async move { Ok(awards) })
    }

    fn list_guests(&self) -> BoxFuture<'static, StorageResult<Vec<GuestEntity>>> {
        let guests = self.guests.read().unwrap_or_else(PoisonError::into_inner).clone();
        Box::pin(async move { Ok(guests) })
    }

    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        let rooms = self.rooms.read().unwrap_or_else(PoisonError::into_inner).clone();
        Box::pin(async move { Ok(rooms) })
    }
}
