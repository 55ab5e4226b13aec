pub mod event;
pub mod fact;
mod hub;
pub mod store;

use std::{sync::Arc, time::SystemTime};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{config::AppConfig, dao::roster_store::RosterStore};

pub use self::hub::FactHub;
use self::{
    event::Mutation,
    store::{Committed, StateStore},
};
use crate::dao::storage::StorageResult;

/// Handle to the server state shared by every handler and task.
pub type SharedState = Arc<ServerState>;

/// Role a client declares when opening its WebSocket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    /// Event controller.
    Admin,
    /// Participant submitting predictions.
    Guest,
    /// Passive public screen.
    #[default]
    Display,
}

#[derive(Debug, Clone)]
/// Registry entry for a connected client, kept for logging and health output.
pub struct ClientConnection {
    /// Connection id assigned on upgrade.
    pub id: Uuid,
    /// Role declared in the query string.
    pub role: ClientRole,
    /// Time of the upgrade.
    pub connected_at: SystemTime,
}

/// Central server state: the event store, the fact hub and the connection registry.
pub struct ServerState {
    config: AppConfig,
    store: StateStore,
    roster: Arc<dyn RosterStore>,
    facts: FactHub,
    connections: DashMap<Uuid, ClientConnection>,
}

impl ServerState {
    /// Construct a new [`ServerState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The store starts in degraded mode until a backend is installed.
    pub fn new(config: AppConfig, roster: Arc<dyn RosterStore>) -> SharedState {
        Arc::new(Self {
            store: StateStore::new(
                config.default_event_title.clone(),
                config.store_write_timeout,
            ),
            facts: FactHub::new(config.broadcast_capacity),
            roster,
            connections: DashMap::new(),
            config,
        })
    }

    /// Configuration the server was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Authoritative event state.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Catalog and guest roster.
    pub fn roster(&self) -> &Arc<dyn RosterStore> {
        &self.roster
    }

    /// Hub every connection subscribes to.
    pub fn facts(&self) -> &FactHub {
        &self.facts
    }

    /// Persist `mutation` and fan its fact out to every subscriber.
    ///
    /// Publication happens inside the store's write gate, so facts reach
    /// subscribers in commit order.
    pub async fn commit(&self, mutation: Mutation) -> StorageResult<Committed> {
        self.store
            .mutate_and(mutation, |committed| {
                self.facts.publish(committed.fact.clone());
            })
            .await
    }

    /// Track a newly opened client connection.
    pub fn register_connection(&self, role: ClientRole) -> ClientConnection {
        let connection = ClientConnection {
            id: Uuid::new_v4(),
            role,
            connected_at: SystemTime::now(),
        };
        self.connections.insert(connection.id, connection.clone());
        connection
    }

    /// Forget a closed connection.
    pub fn unregister_connection(&self, id: &Uuid) -> Option<ClientConnection> {
        self.connections.remove(id).map(|(_, connection)| connection)
    }

    /// Registry of open connections keyed by their identifier.
    pub fn connections(&self) -> &DashMap<Uuid, ClientConnection> {
        &self.connections
    }
}
