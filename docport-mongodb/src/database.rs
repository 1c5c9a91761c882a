use async_trait::async_trait;
use bson::{Document, doc};
use docport_core::{
    collection::Collection,
    config::Config,
    connect::establish,
    database::{Database, DatabaseBuilder},
    error::{DatabaseError, DatabaseResult},
    index::Indexer,
};
use mongodb::{
    Client, Database as DriverDatabase,
    options::{ClientOptions, ServerAddress},
};
use tracing::{debug, info};

use crate::{
    collection::MongoCollection,
    error::driver_error,
    indexer::MongoIndexer,
    session::{SessionLease, SessionTracker},
};

/// A MongoDB database reached through a shared connection pool.
///
/// Cloning is cheap; clones share the pool and the session count.
#[derive(Debug, Clone)]
pub struct MongoDatabase {
    client: Client,
    database: DriverDatabase,
    sessions: SessionTracker,
}

impl MongoDatabase {
    pub fn new(client: Client, database: &str) -> Self {
        Self {
            database: client.database(database),
            client,
            sessions: SessionTracker::default(),
        }
    }

    pub fn builder(config: Config) -> MongoDatabaseBuilder {
        MongoDatabaseBuilder::new(config)
    }

    /// Connects with `config`, retrying as configured.
    pub async fn connect(config: Config) -> DatabaseResult<Self> {
        Self::builder(config).build().await
    }

    /// The database name.
    pub fn name(&self) -> &str {
        self.database.name()
    }

    /// The underlying driver client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Number of sessions currently leased by operations or open handles.
    pub fn leased_sessions(&self) -> usize {
        self.sessions.leased()
    }

    fn mongo_collection(&self, name: &str) -> MongoCollection {
        MongoCollection::new(self.client.clone(), self.database.clone(), name, self.sessions.clone())
    }

    async fn refresh(&self) -> DatabaseResult<SessionLease> {
        let session = self.client.start_session().await.map_err(driver_error)?;
        Ok(self.sessions.lease(session))
    }
}

#[async_trait]
impl Database for MongoDatabase {
    async fn ping(&self) -> DatabaseResult<()> {
        let mut session = self.refresh().await?;
        self.database
            .run_command(doc! { "ping": 1 })
            .session(&mut *session)
            .await
            .map_err(driver_error)?;

        Ok(())
    }

    /// Shuts the pool down without waiting for sessions held by open handles.
    async fn close(&self) {
        self.client.clone().shutdown().immediate(true).await;
        info!(database = self.name(), "connection closed");
    }

    fn collection(&self, name: &str) -> Box<dyn Collection> {
        Box::new(self.mongo_collection(name))
    }

    async fn collections(&self) -> DatabaseResult<Vec<Box<dyn Collection>>> {
        let mut session = self.refresh().await?;
        let names = self
            .database
            .list_collection_names()
            .session(&mut *session)
            .await
            .map_err(driver_error)?;

        Ok(names
            .iter()
            .map(|name| Box::new(self.mongo_collection(name)) as Box<dyn Collection>)
            .collect())
    }

    fn indexer(&self, collection: &str) -> Box<dyn Indexer> {
        Box::new(MongoIndexer::new(
            self.client.clone(),
            self.database.collection::<Document>(collection),
            self.sessions.clone(),
        ))
    }

    async fn drop_database(&self) -> DatabaseResult<()> {
        let mut session = self.refresh().await?;
        self.database
            .drop()
            .session(&mut *session)
            .await
            .map_err(driver_error)?;
        debug!(database = self.name(), "database dropped");

        Ok(())
    }
}

fn client_options(config: &Config) -> DatabaseResult<ClientOptions> {
    let hosts = config
        .addrs
        .iter()
        .map(|addr| ServerAddress::parse(addr.trim()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DatabaseError::Configuration(e.to_string()))?;

    let mut options = ClientOptions::default();
    options.hosts = hosts;
    options.connect_timeout = Some(config.dial_timeout());
    options.server_selection_timeout = Some(config.dial_timeout());
    options.max_idle_time = config.max_idle_time;

    Ok(options)
}

/// Builder for [`MongoDatabase`].
///
/// Each dial attempt creates a client and pings the server; the attempt only
/// succeeds once the ping does.
#[derive(Debug, Clone)]
pub struct MongoDatabaseBuilder {
    config: Config,
}

impl MongoDatabaseBuilder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DatabaseBuilder for MongoDatabaseBuilder {
    type Database = MongoDatabase;

    async fn build(self) -> DatabaseResult<Self::Database> {
        self.config.validate()?;
        let options = client_options(&self.config)?;

        let client = establish(&self.config, |config| {
            let options = options.clone();
            let database = config.database.clone();

            async move {
                let client = Client::with_options(options)?;
                client.database(&database).run_command(doc! { "ping": 1 }).await?;

                Ok::<_, mongodb::error::Error>(client)
            }
        })
        .await?;

        Ok(MongoDatabase::new(client, &self.config.database))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn options_carry_hosts_and_timeouts() {
        let config = Config::builder()
            .addrs(["db1:27017", "db2"])
            .database("app")
            .timeout(Duration::from_secs(5))
            .max_idle_time(Duration::from_secs(30))
            .build()
            .unwrap();

        let options = client_options(&config).unwrap();
        assert_eq!(
            options.hosts,
            vec![
                ServerAddress::parse("db1:27017").unwrap(),
                ServerAddress::parse("db2").unwrap(),
            ]
        );
        assert_eq!(options.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.server_selection_timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.max_idle_time, Some(Duration::from_secs(30)));
    }

    #[test]
    fn default_dial_timeout_applies() {
        let options = client_options(&Config::new(["localhost"], "app")).unwrap();
        assert_eq!(options.connect_timeout, Some(docport_core::config::DEFAULT_TIMEOUT));
    }

    #[test]
    fn malformed_address_is_a_configuration_error() {
        let err = client_options(&Config::new(["localhost:notaport"], "app")).unwrap_err();
        assert!(matches!(err, DatabaseError::Configuration(_)));
    }

    #[tokio::test]
    async fn close_returns_while_a_query_holds_a_session() {
        let options = client_options(&Config::new(["127.0.0.1:1"], "app")).unwrap();
        let database = MongoDatabase::new(Client::with_options(options).unwrap(), "app");

        let query = database.collection("people").find(doc! {}).await.unwrap();
        assert_eq!(database.leased_sessions(), 1);

        tokio::time::timeout(Duration::from_secs(5), database.close())
            .await
            .expect("close should not wait for open handles");

        drop(query);
        assert_eq!(database.leased_sessions(), 0);
    }

    #[tokio::test]
    async fn invalid_config_fails_before_dialing() {
        let err = MongoDatabase::connect(Config::new(Vec::<String>::new(), "app"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Configuration(_)));
    }
}
