//! A narrow, driver-neutral database access layer.
//!
//! This crate is the core of the docport project and provides:
//!
//! - **Database and collection traits** ([`database`], [`collection`], [`index`]) - The capability surface backends implement
//! - **Queries, cursors, batches and pipelines** ([`query`], [`iter`], [`bulk`], [`pipe`]) - Session-bound handles with backend executors
//! - **Change descriptors and results** ([`change`]) - Find-and-modify requests and write counts
//! - **Configuration** ([`config`]) - Connection configuration and its builder
//! - **Connection establishment** ([`connect`]) - Dialing with linear retry backoff
//! - **Document conversion** ([`document`]) - Helpers between serde types and BSON documents
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use docport::prelude::*;
//! use bson::doc;
//!
//! async fn rename(database: &impl Database) -> DatabaseResult<()> {
//!     let users = database.collection("users");
//!     users.update(doc! { "_id": 1 }, doc! { "$set": { "name": "Alicia" } }).await?;
//!
//!     let mut iter = users.find(doc! {}).await?.sort(["name"]).limit(10).iter().await?;
//!     while let Some(user) = iter.next().await {
//!         println!("{user}");
//!     }
//!     iter.close()
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docport_core;

pub mod bulk;
pub mod change;
pub mod collection;
pub mod config;
pub mod connect;
pub mod database;
pub mod document;
pub mod error;
pub mod index;
pub mod iter;
pub mod pipe;
pub mod query;
