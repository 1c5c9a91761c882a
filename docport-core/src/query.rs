//! Query construction and execution.
//!
//! A [`Query`] is returned by [`Collection::find`](crate::collection::Collection::find)
//! and [`Collection::find_id`](crate::collection::Collection::find_id). It is bound
//! to a backend [`QueryExecutor`] which owns whatever session the backend leased
//! for it. Refinements ([`limit`](Query::limit), [`skip`](Query::skip),
//! [`sort`](Query::sort), [`select`](Query::select)) only change the
//! [`QuerySpec`]; nothing is sent until a terminal operation runs.
//!
//! Terminal operations consume the query. The executor, and with it the
//! leased session, is dropped when the operation returns, whether it
//! succeeded or not. [`Query::iter`] hands the session over to the returned
//! [`Iter`] instead.
//!
//! # Example
//!
//! ```ignore
//! use bson::doc;
//!
//! let names = collection
//!     .find(doc! { "active": true })
//!     .await?
//!     .sort(["name", "-age"])
//!     .limit(10)
//!     .all()
//!     .await?;
//! ```

use std::fmt;

use async_trait::async_trait;
use bson::{Bson, Document};
use serde::de::DeserializeOwned;

use crate::{
    change::{Applied, Change},
    document::{from_document, from_documents},
    error::DatabaseResult,
    iter::{Cursor, Iter},
};

/// The refinements accumulated on a [`Query`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    /// Selector matching the documents.
    pub filter: Document,
    /// Sort keys. A leading `-` sorts the field in descending order.
    pub sort: Vec<String>,
    /// Number of documents to skip.
    pub skip: Option<u64>,
    /// Maximum number of documents to return.
    pub limit: Option<u64>,
    /// Projection selecting the returned fields.
    pub projection: Option<Document>,
}

impl QuerySpec {
    /// Creates a spec matching `filter` with no refinements.
    pub fn new(filter: Document) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

/// A field of a sort or index key, parsed from the `"-field"` syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyField<'a> {
    /// The field name without direction prefix.
    pub name: &'a str,
    /// Whether the field is ordered descending.
    pub descending: bool,
}

impl<'a> KeyField<'a> {
    /// Parses a key field. `"-age"` is `age` descending, `"+age"` and `"age"` ascending.
    pub fn parse(field: &'a str) -> Self {
        if let Some(name) = field.strip_prefix('-') {
            Self { name, descending: true }
        } else {
            Self {
                name: field.strip_prefix('+').unwrap_or(field),
                descending: false,
            }
        }
    }

    /// The direction as the conventional `1` / `-1`.
    pub fn direction(&self) -> i32 {
        if self.descending { -1 } else { 1 }
    }
}

/// Backend half of a [`Query`].
///
/// An executor is created per query and owns the session leased for it.
/// Each method performs exactly one round trip; the [`Query`] wrapper
/// guarantees at most one of them is called before the executor is dropped.
#[async_trait]
pub trait QueryExecutor: Send {
    /// Returns every matching document.
    async fn all(&mut self, spec: &QuerySpec) -> DatabaseResult<Vec<Document>>;

    /// Returns the first matching document, if any.
    async fn one(&mut self, spec: &QuerySpec) -> DatabaseResult<Option<Document>>;

    /// Counts the matching documents, honouring skip and limit.
    async fn count(&mut self, spec: &QuerySpec) -> DatabaseResult<u64>;

    /// Returns the distinct values of `key` among the matching documents.
    async fn distinct(&mut self, key: &str, spec: &QuerySpec) -> DatabaseResult<Vec<Bson>>;

    /// Runs a find-and-modify on the first matching document.
    async fn apply(&mut self, change: Change, spec: &QuerySpec) -> DatabaseResult<Applied>;

    /// Opens a cursor over the matching documents, moving the session into it.
    async fn iter(&mut self, spec: &QuerySpec) -> DatabaseResult<Box<dyn Cursor>>;
}

/// A refinable query bound to a backend session.
pub struct Query {
    spec: QuerySpec,
    executor: Box<dyn QueryExecutor>,
}

impl Query {
    /// Creates a query matching `filter`, executed by `executor`.
    pub fn new(filter: Document, executor: Box<dyn QueryExecutor>) -> Self {
        Self {
            spec: QuerySpec::new(filter),
            executor,
        }
    }

    /// Returns the accumulated refinements.
    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// Limits the number of returned documents.
    pub fn limit(mut self, n: u64) -> Self {
        self.spec.limit = Some(n);
        self
    }

    /// Skips the first `n` matching documents.
    pub fn skip(mut self, n: u64) -> Self {
        self.spec.skip = Some(n);
        self
    }

    /// Sorts by the given fields. Prefix a field with `-` for descending order.
    pub fn sort<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.sort = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts the returned fields to the given projection.
    pub fn select(mut self, projection: Document) -> Self {
        self.spec.projection = Some(projection);
        self
    }

    /// Returns every matching document.
    pub async fn all(mut self) -> DatabaseResult<Vec<Document>> {
        self.executor.all(&self.spec).await
    }

    /// Returns every matching document decoded as `T`.
    pub async fn all_as<T>(self) -> DatabaseResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        from_documents(self.all().await?)
    }

    /// Returns the first matching document, or `None` when nothing matches.
    pub async fn one(mut self) -> DatabaseResult<Option<Document>> {
        self.executor.one(&self.spec).await
    }

    /// Returns the first matching document decoded as `T`.
    pub async fn one_as<T>(self) -> DatabaseResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.one().await?.map(from_document).transpose()
    }

    /// Counts the matching documents.
    pub async fn count(mut self) -> DatabaseResult<u64> {
        self.executor.count(&self.spec).await
    }

    /// Returns the distinct values of `key` among the matching documents.
    pub async fn distinct(mut self, key: &str) -> DatabaseResult<Vec<Bson>> {
        self.executor.distinct(key, &self.spec).await
    }

    /// Applies a [`Change`] to the first matching document.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`](crate::error::DatabaseError::NotFound)
    /// when nothing matched and the change is not an upsert.
    pub async fn apply(mut self, change: Change) -> DatabaseResult<Applied> {
        self.executor.apply(change, &self.spec).await
    }

    /// Opens a cursor over the matching documents.
    ///
    /// The session stays open until the cursor is exhausted or closed.
    pub async fn iter(mut self) -> DatabaseResult<Iter> {
        Ok(Iter::new(self.executor.iter(&self.spec).await?))
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").field("spec", &self.spec).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatabaseError;
    use bson::doc;
    use rstest::rstest;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    /// Records the spec it executed and counts how often it was dropped.
    struct RecordingExecutor {
        seen: Arc<std::sync::Mutex<Vec<QuerySpec>>>,
        released: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Drop for RecordingExecutor {
        fn drop(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl RecordingExecutor {
        fn record(&self, spec: &QuerySpec) -> DatabaseResult<()> {
            self.seen.lock().unwrap().push(spec.clone());
            if self.fail {
                Err(DatabaseError::operation("server went away"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl QueryExecutor for RecordingExecutor {
        async fn all(&mut self, spec: &QuerySpec) -> DatabaseResult<Vec<Document>> {
            self.record(spec)?;
            Ok(vec![doc! { "name": "Alice" }, doc! { "name": "Bob" }])
        }

        async fn one(&mut self, spec: &QuerySpec) -> DatabaseResult<Option<Document>> {
            self.record(spec)?;
            Ok(None)
        }

        async fn count(&mut self, spec: &QuerySpec) -> DatabaseResult<u64> {
            self.record(spec)?;
            Ok(2)
        }

        async fn distinct(&mut self, _key: &str, spec: &QuerySpec) -> DatabaseResult<Vec<Bson>> {
            self.record(spec)?;
            Ok(vec![Bson::from("Alice")])
        }

        async fn apply(&mut self, _change: Change, spec: &QuerySpec) -> DatabaseResult<Applied> {
            self.record(spec)?;
            Ok(Applied::default())
        }

        async fn iter(&mut self, spec: &QuerySpec) -> DatabaseResult<Box<dyn Cursor>> {
            self.record(spec)?;
            Err(DatabaseError::operation("cursors are not recorded"))
        }
    }

    fn recording_query(fail: bool) -> (Query, Arc<std::sync::Mutex<Vec<QuerySpec>>>, Arc<AtomicUsize>) {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let released = Arc::new(AtomicUsize::new(0));
        let executor = RecordingExecutor {
            seen: seen.clone(),
            released: released.clone(),
            fail,
        };

        (Query::new(doc! { "active": true }, Box::new(executor)), seen, released)
    }

    #[tokio::test]
    async fn refinements_reach_the_executor() {
        let (query, seen, _) = recording_query(false);

        let names = query
            .sort(["name", "-age"])
            .skip(5)
            .limit(10)
            .select(doc! { "name": 1 })
            .all()
            .await
            .unwrap();

        assert_eq!(names.len(), 2);
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[QuerySpec {
                filter: doc! { "active": true },
                sort: vec!["name".into(), "-age".into()],
                skip: Some(5),
                limit: Some(10),
                projection: Some(doc! { "name": 1 }),
            }]
        );
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    #[tokio::test]
    async fn terminal_operations_release_the_executor(#[case] fail: bool) {
        let (query, _, released) = recording_query(fail);
        let result = query.count().await;

        assert_eq!(result.is_err(), fail);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn typed_decoding() {
        #[derive(serde::Deserialize)]
        struct Named {
            name: String,
        }

        let (query, _, _) = recording_query(false);
        let named = query.all_as::<Named>().await.unwrap();

        assert_eq!(
            named.iter().map(|n| n.name.as_str()).collect::<Vec<_>>(),
            vec!["Alice", "Bob"]
        );

        let (query, _, _) = recording_query(false);
        assert!(query.one_as::<Named>().await.unwrap().is_none());
    }

    #[rstest]
    #[case("name", "name", false, 1)]
    #[case("-age", "age", true, -1)]
    #[case("+age", "age", false, 1)]
    fn key_fields(
        #[case] raw: &str,
        #[case] name: &str,
        #[case] descending: bool,
        #[case] direction: i32,
    ) {
        let key = KeyField::parse(raw);
        assert_eq!(key.name, name);
        assert_eq!(key.descending, descending);
        assert_eq!(key.direction(), direction);
    }
}
