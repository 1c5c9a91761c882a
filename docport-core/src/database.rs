//! The database capability surface.
//!
//! This module defines the traits backends implement to expose a database to
//! application code.
//!
//! # Traits
//!
//! - [`Database`]: connection-level operations and access to collections
//! - [`DatabaseBuilder`]: factory trait that establishes a connection
//!
//! # Examples
//!
//! ```ignore
//! use docport::{config::Config, database::{Database, DatabaseBuilder}, mongodb::MongoDatabase};
//!
//! let database = MongoDatabase::builder(Config::new(["localhost:27017"], "app"))
//!     .build()
//!     .await?;
//!
//! database.ping().await?;
//! let users = database.collection("users");
//! ```

use async_trait::async_trait;

use crate::{collection::Collection, error::DatabaseResult, index::Indexer};

/// A connection bound to one named database.
///
/// # Thread Safety
///
/// Implementations are shared between tasks. The connection pool behind them
/// is shared as well; every operation leases its own session from it.
#[async_trait]
pub trait Database: Send + Sync {
    /// Runs a trivial command to check the server is reachable.
    async fn ping(&self) -> DatabaseResult<()>;

    /// Closes the connection pool.
    async fn close(&self);

    /// Returns a handle to the named collection. No I/O is performed.
    fn collection(&self, name: &str) -> Box<dyn Collection>;

    /// Returns handles to every existing collection.
    async fn collections(&self) -> DatabaseResult<Vec<Box<dyn Collection>>>;

    /// Returns the index creator for the named collection.
    fn indexer(&self, collection: &str) -> Box<dyn Indexer>;

    /// Drops the whole database.
    ///
    /// # Warning
    ///
    /// This operation is irreversible.
    async fn drop_database(&self) -> DatabaseResult<()>;
}

#[async_trait]
impl<D> Database for &D
where
    D: Database,
{
    async fn ping(&self) -> DatabaseResult<()> {
        (*self).ping().await
    }

    async fn close(&self) {
        (*self).close().await
    }

    fn collection(&self, name: &str) -> Box<dyn Collection> {
        (*self).collection(name)
    }

    async fn collections(&self) -> DatabaseResult<Vec<Box<dyn Collection>>> {
        (*self).collections().await
    }

    fn indexer(&self, collection: &str) -> Box<dyn Indexer> {
        (*self).indexer(collection)
    }

    async fn drop_database(&self) -> DatabaseResult<()> {
        (*self).drop_database().await
    }
}

/// Factory that establishes a [`Database`] connection.
#[async_trait]
pub trait DatabaseBuilder {
    type Database: Database;

    async fn build(self) -> DatabaseResult<Self::Database>;
}
