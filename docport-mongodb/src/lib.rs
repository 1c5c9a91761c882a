//! MongoDB backend for docport.
//!
//! This crate implements the docport capability traits on top of the official
//! async MongoDB driver. A single [`Client`](mongodb::Client) pool is shared
//! by every handle; each operation leases its own session from it and gives
//! the session back when the operation, or the query, cursor, batch or
//! pipeline handle it returned, is done.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docport = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Notes
//!
//! - Updates whose first key starts with `$` are applied as operator updates,
//!   anything else replaces the matched document.
//! - [`Bulk`](docport_core::bulk::Bulk) batches are sent as one ordered
//!   `bulkWrite` command, which requires MongoDB 8.0 or newer.
//! - [`Query::apply`](docport_core::query::Query::apply) runs `findAndModify`.
//!
//! # Example
//!
//! ```ignore
//! use docport::{config::Config, database::{Database, DatabaseBuilder}, mongodb::MongoDatabase};
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
//!     database.ping().await?;
//!     database.close().await;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docport_mongodb;

pub mod adapt;
mod bulk;
mod collection;
mod database;
mod error;
mod indexer;
mod pipe;
mod query;
mod session;

pub use collection::MongoCollection;
pub use database::{MongoDatabase, MongoDatabaseBuilder};
pub use indexer::MongoIndexer;
