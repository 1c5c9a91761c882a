//! Index descriptors and index creation.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::DatabaseResult;

/// A single index of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    /// The indexed fields, in order. Several fields form a compound index and
    /// a leading `-` makes a field descending.
    pub key: Vec<String>,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// If set, the server periodically deletes documents whose indexed time
    /// value is older than this.
    pub expire_after: Option<Duration>,
}

impl Index {
    /// Creates a non-unique index over `key`.
    pub fn new<I, S>(key: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into_iter().map(Into::into).collect(),
            unique: false,
            expire_after: None,
        }
    }

    /// Makes the index unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Expires documents after the given age.
    pub fn expire_after(mut self, ttl: Duration) -> Self {
        self.expire_after = Some(ttl);
        self
    }
}

/// Creates indexes for one collection.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Creates every given index, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Index`](crate::error::DatabaseError::Index)
    /// naming the key of the index that could not be created.
    async fn create_all(&self, indexes: Vec<Index>) -> DatabaseResult<()>;
}
