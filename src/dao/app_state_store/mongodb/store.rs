use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{Client, Collection, Database};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::{establish_connection, ping},
    error::{MongoDaoError, MongoResult},
    models::{MongoStateDocument, state_doc_filter},
};
use crate::dao::{app_state_store::AppStateStore, models::AppStateEntity, storage::StorageResult};

const STATE_COLLECTION_NAME: &str = "app_state";

/// Keeps the state as one upserted MongoDB document.
#[derive(Clone)]
pub struct MongoAppStateStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        ping(&database).await
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = establish_connection(&self.config).await?;
        let mut guard = self.state.write().await;
        let previous = std::mem::replace(&mut guard.client, client);
        guard.database = database;
        drop(guard);
        previous.shutdown().await;
        Ok(())
    }
}

impl MongoAppStateStore {
    /// Establish a connection to MongoDB.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) = establish_connection(&config).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        Ok(Self { inner })
    }

    async fn collection(&self) -> Collection<MongoStateDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoStateDocument>(STATE_COLLECTION_NAME)
    }

    async fn find_state(&self) -> MongoResult<Option<AppStateEntity>> {
        let collection = self.collection().await;
        let document = collection
            .find_one(state_doc_filter())
            .await
            .map_err(|source| MongoDaoError::Document {
                action: "reading",
                source,
            })?;
        Ok(document.map(Into::into))
    }

    async fn save_state(&self, state: AppStateEntity) -> MongoResult<()> {
        let document: MongoStateDocument = state.into();
        let collection = self.collection().await;
        collection
            .replace_one(state_doc_filter(), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Document {
                action: "upserting",
                source,
            })?;
        Ok(())
    }
}

impl AppStateStore for MongoAppStateStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    fn load(&self) -> BoxFuture<'static, StorageResult<Option<AppStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_state().await.map_err(Into::into) })
    }

    fn save(&self, state: AppStateEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_state(state).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
