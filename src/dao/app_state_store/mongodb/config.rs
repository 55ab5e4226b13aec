use std::time::Duration;

use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_DB: &str = "awards_live";
/// Upper bound on server selection so an unreachable deployment fails fast.
const SELECTION_TIMEOUT: Duration = Duration::from_secs(2);

/// Parsed client options plus the database holding the state document.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Options parsed from the connection URI.
    pub options: ClientOptions,
    /// Database holding the `app_state` collection.
    pub database_name: String,
}

impl MongoConfig {
    /// Parse `uri`, falling back to the default database name.
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(MongoDaoError::InvalidUri)?;
        options
            .server_selection_timeout
            .get_or_insert(SELECTION_TIMEOUT);
        options.app_name.get_or_insert_with(|| "awards-live-back".to_owned());

        Ok(Self {
            options,
            database_name: db_name.unwrap_or(DEFAULT_DB).to_owned(),
        })
    }

    /// Read `MONGO_URI` and the optional `MONGO_DB`.
    pub async fn from_env() -> MongoResult<Self> {
        let uri = std::env::var("MONGO_URI")
            .map_err(|_| MongoDaoError::Unconfigured { var: "MONGO_URI" })?;
        let db = std::env::var("MONGO_DB").ok();
        Self::from_uri(&uri, db.as_deref()).await
    }
}
