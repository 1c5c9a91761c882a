//! Query and cursor executors.

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use docport_core::{
    change::{Applied, Change},
    error::{DatabaseError, DatabaseResult},
    iter::Cursor,
    query::{KeyField, QueryExecutor, QuerySpec},
};
use futures::TryStreamExt;
use mongodb::{
    Collection as DriverCollection, Database as DriverDatabase, SessionCursor,
    options::{CountOptions, FindOneOptions, FindOptions},
};
use tracing::debug;

use crate::{
    adapt::{DriverChange, adapt_change_info, count},
    error::{driver_error, session_released},
    session::SessionLease,
};

/// Builds a key document from `"-field"` style names, preserving order.
pub(crate) fn keys_document<S: AsRef<str>>(fields: &[S]) -> Document {
    fields
        .iter()
        .map(|field| {
            let key = KeyField::parse(field.as_ref());
            (key.name.to_string(), Bson::Int32(key.direction()))
        })
        .collect()
}

fn sort_document(spec: &QuerySpec) -> Option<Document> {
    (!spec.sort.is_empty()).then(|| keys_document(&spec.sort))
}

/// A limit of zero means no limit.
fn limit(spec: &QuerySpec) -> Option<u64> {
    spec.limit.filter(|n| *n > 0)
}

fn find_options(spec: &QuerySpec) -> FindOptions {
    let mut options = FindOptions::default();
    options.sort = sort_document(spec);
    options.skip = spec.skip;
    options.limit = limit(spec).map(|n| i64::try_from(n).unwrap_or(i64::MAX));
    options.projection = spec.projection.clone();
    options
}

fn count_options(spec: &QuerySpec) -> CountOptions {
    let mut options = CountOptions::default();
    options.skip = spec.skip;
    options.limit = limit(spec);
    options
}

/// Runs one query on a leased session.
///
/// `iter` moves the session into the returned cursor; every other operation
/// leaves it here to be released when the executor is dropped.
pub(crate) struct MongoQuery {
    database: DriverDatabase,
    collection: DriverCollection<Document>,
    session: Option<SessionLease>,
}

impl MongoQuery {
    pub(crate) fn new(database: DriverDatabase, collection: DriverCollection<Document>, session: SessionLease) -> Self {
        Self {
            database,
            collection,
            session: Some(session),
        }
    }
}

#[async_trait]
impl QueryExecutor for MongoQuery {
    async fn all(&mut self, spec: &QuerySpec) -> DatabaseResult<Vec<Document>> {
        let session = self.session.as_deref_mut().ok_or_else(session_released)?;
        let mut cursor = self
            .collection
            .find(spec.filter.clone())
            .with_options(find_options(spec))
            .session(&mut *session)
            .await
            .map_err(driver_error)?;

        cursor.stream(session).try_collect().await.map_err(driver_error)
    }

    async fn one(&mut self, spec: &QuerySpec) -> DatabaseResult<Option<Document>> {
        let session = self.session.as_deref_mut().ok_or_else(session_released)?;
        let mut options = FindOneOptions::default();
        options.sort = sort_document(spec);
        options.skip = spec.skip;
        options.projection = spec.projection.clone();

        self.collection
            .find_one(spec.filter.clone())
            .with_options(options)
            .session(session)
            .await
            .map_err(driver_error)
    }

    async fn count(&mut self, spec: &QuerySpec) -> DatabaseResult<u64> {
        let session = self.session.as_deref_mut().ok_or_else(session_released)?;

        self.collection
            .count_documents(spec.filter.clone())
            .with_options(count_options(spec))
            .session(session)
            .await
            .map_err(driver_error)
    }

    async fn distinct(&mut self, key: &str, spec: &QuerySpec) -> DatabaseResult<Vec<Bson>> {
        let session = self.session.as_deref_mut().ok_or_else(session_released)?;

        self.collection
            .distinct(key, spec.filter.clone())
            .session(session)
            .await
            .map_err(driver_error)
    }

    async fn apply(&mut self, change: Change, spec: &QuerySpec) -> DatabaseResult<Applied> {
        let session = self.session.as_deref_mut().ok_or_else(session_released)?;

        let mut command = doc! {
            "findAndModify": self.collection.name(),
            "query": spec.filter.clone(),
        };
        if let Some(sort) = sort_document(spec) {
            command.insert("sort", sort);
        }
        if let Some(projection) = &spec.projection {
            command.insert("fields", projection.clone());
        }
        if change.remove {
            command.insert("remove", true);
        } else {
            command.insert("update", change.update);
            command.insert("new", change.return_new);
            command.insert("upsert", change.upsert);
        }

        let reply = self
            .database
            .run_command(command)
            .session(session)
            .await
            .map_err(driver_error)?;

        let status = reply.get_document("lastErrorObject").ok();
        if status.is_some_and(|status| status.get("n").and_then(count).unwrap_or(0) == 0) {
            return Err(DatabaseError::NotFound(self.collection.name().to_string()));
        }
        debug!(collection = self.collection.name(), remove = change.remove, "document modified");

        Ok(Applied {
            info: adapt_change_info(status.map(|status| DriverChange::from_last_error_object(status, change.remove))),
            document: match reply.get("value") {
                Some(Bson::Document(document)) => Some(document.clone()),
                _ => None,
            },
        })
    }

    async fn iter(&mut self, spec: &QuerySpec) -> DatabaseResult<Box<dyn Cursor>> {
        let mut session = self.session.take().ok_or_else(session_released)?;
        let cursor = self
            .collection
            .find(spec.filter.clone())
            .with_options(find_options(spec))
            .session(&mut *session)
            .await
            .map_err(driver_error)?;

        Ok(Box::new(MongoCursor { cursor, session }))
    }
}

/// A server cursor together with the session it was opened on.
pub(crate) struct MongoCursor {
    cursor: SessionCursor<Document>,
    session: SessionLease,
}

#[async_trait]
impl Cursor for MongoCursor {
    async fn next(&mut self) -> Option<DatabaseResult<Document>> {
        self.cursor
            .next(&mut self.session)
            .await
            .map(|result| result.map_err(driver_error))
    }
}
