//! Main docport crate providing a narrow, session-scoped document database layer.
//!
//! This crate is the primary entry point for users of docport. It re-exports the
//! core traits and handles from `docport-core` and gives access to the backend
//! and test support crates behind cargo features.
//!
//! # Features
//!
//! - **Small capability surface** - `Database`, `Collection`, `Query`, `Iter`, `Bulk`, `Pipe` and `Indexer`
//! - **Session per operation** - Every call leases its own session and always gives it back
//! - **Retrying connections** - Dialing with linear backoff up to a configured attempt limit
//! - **Test support** - mockall doubles and disposable database instances (requires `testkit` feature)
//!
//! # Quick Start
//!
//! ```ignore
//! use docport::{prelude::*, mongodb::MongoDatabase};
//! use bson::doc;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! pub struct User {
//!     #[serde(rename = "_id")]
//!     pub id: i32,
//!     pub name: String,
//!     pub age: u32,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::builder()
//!         .addr("localhost:27017")
//!         .database("app")
//!         .max_retry_attempts(3)
//!         .build()?;
//!
//!     let database = MongoDatabase::builder(config).build().await?;
//!     let users = database.collection("users");
//!
//!     users.insert(to_document(&User { id: 1, name: "Alice".into(), age: 31 })?).await?;
//!     users.upsert(doc! { "_id": 2 }, doc! { "$set": { "name": "Bob", "age": 27 } }).await?;
//!
//!     let adults: Vec<User> = users
//!         .find(doc! { "age": { "$gte": 18 } })
//!         .await?
//!         .sort(["-age", "name"])
//!         .limit(10)
//!         .all_as()
//!         .await?;
//!     println!("{adults:?}");
//!
//!     let older = users
//!         .find_id(1.into())
//!         .await?
//!         .apply(Change::update(doc! { "$inc": { "age": 1 } }).return_new(true))
//!         .await?;
//!     println!("{:?}", older.document);
//!
//!     database.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Indexes
//!
//! ```ignore
//! use std::time::Duration;
//!
//! database
//!     .indexer("sessions")
//!     .create_all(vec![
//!         Index::new(["token"]).unique(),
//!         Index::new(["created"]).expire_after(Duration::from_secs(3600)),
//!     ])
//!     .await?;
//! ```
//!
//! # Backends
//!
//! - [`mongodb`] - MongoDB backend (requires `mongodb` feature, enabled by default)
//! - [`testkit`] - Mocks and disposable test instances (requires `testkit` feature)

pub mod prelude;

pub use docport_core::{bulk, change, collection, config, connect, database, document, error, index, iter, pipe, query};

// Re-export BSON types for convenience
pub use bson;

/// MongoDB backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docport_mongodb::{MongoCollection, MongoDatabase, MongoDatabaseBuilder, MongoIndexer, adapt};
}

/// Test doubles and disposable database instances.
///
/// This module is only available when the `testkit` feature is enabled.
#[cfg(feature = "testkit")]
pub mod testkit {
    pub use docport_testkit::*;
}
