//! The collection capability surface.
//!
//! A [`Collection`] is a named set of documents within a
//! [`Database`](crate::database::Database). Documents, selectors and updates
//! are plain [`bson::Document`]s; use [`to_document`](crate::document::to_document)
//! to insert serde types.
//!
//! # Sessions
//!
//! Implementations lease an independent session for every call and release it
//! before returning, on success and on error alike. [`find`](Collection::find),
//! [`find_id`](Collection::find_id), [`bulk`](Collection::bulk) and
//! [`pipe`](Collection::pipe) lease a session that lives in the returned
//! handle until that handle runs or is dropped.
//!
//! # Example
//!
//! ```ignore
//! use bson::doc;
//!
//! let users = database.collection("users");
//! users.insert(doc! { "_id": 1, "name": "Alice" }).await?;
//! users.update(doc! { "_id": 1 }, doc! { "$set": { "name": "Alicia" } }).await?;
//!
//! let alicia = users.find_id(1.into()).await?.one().await?;
//! ```

use async_trait::async_trait;
use bson::{Bson, Document};

use crate::{
    bulk::Bulk,
    change::ChangeInfo,
    error::DatabaseResult,
    pipe::Pipe,
    query::Query,
};

/// Operations on a single collection.
///
/// Write operations that report counts return `Option<ChangeInfo>`; `None`
/// means the backend reported no result, which is different from a result
/// with zero counts.
#[async_trait]
pub trait Collection: Send + Sync {
    /// The collection name.
    fn name(&self) -> &str;

    /// Starts a query over the documents matching `criteria`.
    async fn find(&self, criteria: Document) -> DatabaseResult<Query>;

    /// Starts a query over the document with the given `_id`.
    async fn find_id(&self, id: Bson) -> DatabaseResult<Query>;

    /// Inserts a document.
    async fn insert(&self, document: Document) -> DatabaseResult<()>;

    /// Updates the first document matching `selector`.
    ///
    /// `update` is either an operator document or a full replacement.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`](crate::error::DatabaseError::NotFound)
    /// if nothing matches.
    async fn update(&self, selector: Document, update: Document) -> DatabaseResult<()>;

    /// Updates every document matching `selector`.
    async fn update_all(&self, selector: Document, update: Document) -> DatabaseResult<Option<ChangeInfo>>;

    /// Updates the first document matching `selector`, inserting one if none matches.
    async fn upsert(&self, selector: Document, update: Document) -> DatabaseResult<Option<ChangeInfo>>;

    /// Removes the first document matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`](crate::error::DatabaseError::NotFound)
    /// if nothing matches.
    async fn remove(&self, selector: Document) -> DatabaseResult<()>;

    /// Removes the document with the given `_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`](crate::error::DatabaseError::NotFound)
    /// if there is no such document.
    async fn remove_id(&self, id: Bson) -> DatabaseResult<()>;

    /// Removes every document matching `selector`, or every document when `None`.
    async fn remove_all(&self, selector: Option<Document>) -> DatabaseResult<Option<ChangeInfo>>;

    /// Starts a batch of writes.
    async fn bulk(&self) -> DatabaseResult<Bulk>;

    /// Prepares an aggregation pipeline.
    async fn pipe(&self, pipeline: Vec<Document>) -> DatabaseResult<Pipe>;

    /// Removes every document while keeping the collection and its indexes.
    async fn clean(&self) -> DatabaseResult<()>;
}
