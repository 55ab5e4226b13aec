use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, Response, StatusCode};

use crate::dao::{app_state_store::AppStateStore, models::AppStateEntity, storage::StorageResult};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult, CouchStep},
    models::{CouchStateDocument, STATE_DOC_ID},
};

/// Keeps the state as one CouchDB document, updated by revision.
#[derive(Clone)]
pub struct CouchAppStateStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchAppStateStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder().build().map_err(CouchDaoError::Client)?;
        let auth = config
            .credentials
            .map(|(user, pass)| (Arc::<str>::from(user), Arc::<str>::from(pass)));

        let store = Self {
            client,
            base_url: Arc::from(config.base_url),
            database: Arc::from(config.database),
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            Some((ref user, ref pass)) => builder.basic_auth(user.as_ref(), Some(pass.as_ref())),
            None => builder,
        }
    }

    async fn send(
        &self,
        step: CouchStep,
        method: Method,
        body: Option<&CouchStateDocument>,
    ) -> CouchResult<Response> {
        let url = match step {
            CouchStep::CheckDatabase | CouchStep::CreateDatabase => self.database_url(),
            CouchStep::ReadState | CouchStep::WriteState => {
                format!("{}/{}", self.database_url(), STATE_DOC_ID)
            }
        };
        let mut request = self.authorized(self.client.request(method, url));
        if let Some(document) = body {
            request = request.json(document);
        }
        request
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                step,
                database: self.database.to_string(),
                source,
            })
    }

    fn unexpected(&self, step: CouchStep, status: StatusCode) -> CouchDaoError {
        CouchDaoError::Status {
            step,
            database: self.database.to_string(),
            status,
        }
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let response = self.send(CouchStep::CheckDatabase, Method::GET, None).await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                let created = self.send(CouchStep::CreateDatabase, Method::PUT, None).await?;
                match created.status() {
                    // 412 means another instance created it first.
                    status if status.is_success() || status == StatusCode::PRECONDITION_FAILED => {
                        Ok(())
                    }
                    other => Err(self.unexpected(CouchStep::CreateDatabase, other)),
                }
            }
            other => Err(self.unexpected(CouchStep::CheckDatabase, other)),
        }
    }

    async fn get_document(&self) -> CouchResult<Option<CouchStateDocument>> {
        let response = self.send(CouchStep::ReadState, Method::GET, None).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<CouchStateDocument>()
                .await
                .map(Some)
                .map_err(|source| CouchDaoError::Decode {
                    database: self.database.to_string(),
                    source,
                }),
            other => Err(self.unexpected(CouchStep::ReadState, other)),
        }
    }

    async fn put_document(&self, state: AppStateEntity) -> CouchResult<()> {
        let rev = self.get_document().await?.and_then(|existing| existing.rev);
        let document = CouchStateDocument::from((state, rev));

        let response = self
            .send(CouchStep::WriteState, Method::PUT, Some(&document))
            .await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(CouchDaoError::Conflict {
                database: self.database.to_string(),
            }),
            other => Err(self.unexpected(CouchStep::WriteState, other)),
        }
    }

    async fn ping(&self) -> CouchResult<()> {
        let response = self.send(CouchStep::CheckDatabase, Method::GET, None).await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            other => Err(self.unexpected(CouchStep::CheckDatabase, other)),
        }
    }
}

impl AppStateStore for CouchAppStateStore {
    fn backend_name(&self) -> &'static str {
        "couchdb"
    }

    fn load(&self) -> BoxFuture<'static, StorageResult<Option<AppStateEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store.get_document().await?;
            Ok(document.map(|doc| doc.state))
        })
    }

    fn save(&self, state: AppStateEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.put_document(state).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
