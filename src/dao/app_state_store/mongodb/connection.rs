use mongodb::{Client, Database, bson::doc};

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
};

/// Build a client for `config` and check it with a single ping.
///
/// Failed attempts are retried by the storage supervisor.
pub(super) async fn establish_connection(config: &MongoConfig) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(config.options.clone()).map_err(MongoDaoError::Client)?;
    let database = client.database(&config.database_name);
    ping(&database).await?;
    Ok((client, database))
}

pub(super) async fn ping(database: &Database) -> MongoResult<()> {
    database
        .run_command(doc! { "ping": 1 })
        .await
        .map(drop)
        .map_err(|source| MongoDaoError::Unreachable {
            database: database.name().to_owned(),
            source,
        })
}
