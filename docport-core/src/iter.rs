//! Cursor iteration over query results.
//!
//! [`Iter`] wraps a backend [`Cursor`] that owns a leased session. The cursor
//! is dropped, releasing the session, the first time iteration reports no
//! further results, when iteration fails, or on [`Iter::close`], whichever
//! comes first. Later calls are no-ops.

use std::fmt;

use async_trait::async_trait;
use bson::Document;
use serde::de::DeserializeOwned;

use crate::{
    document::from_document,
    error::{DatabaseError, DatabaseResult},
};

/// Backend half of an [`Iter`]: a server-side cursor fetched incrementally.
#[async_trait]
pub trait Cursor: Send {
    /// Fetches the next document, `None` once the cursor is exhausted.
    async fn next(&mut self) -> Option<DatabaseResult<Document>>;
}

/// Iterator over the results of a query.
pub struct Iter {
    cursor: Option<Box<dyn Cursor>>,
    err: Option<DatabaseError>,
    timed_out: bool,
}

impl Iter {
    /// Wraps an open cursor.
    pub fn new(cursor: Box<dyn Cursor>) -> Self {
        Self {
            cursor: Some(cursor),
            err: None,
            timed_out: false,
        }
    }

    /// Returns the next document, or `None` when iteration is over.
    ///
    /// A failure ends iteration too; it is kept and reported by [`Iter::err`]
    /// and [`Iter::close`].
    pub async fn next(&mut self) -> Option<Document> {
        match self.try_next().await {
            Ok(document) => document,
            Err(err) => {
                self.timed_out = err.is_timeout();
                self.err = Some(err);
                None
            }
        }
    }

    /// Returns the next document decoded as `T`.
    pub async fn next_as<T>(&mut self) -> Option<DatabaseResult<T>>
    where
        T: DeserializeOwned,
    {
        self.next().await.map(from_document)
    }

    /// Returns the next document, surfacing a failure directly.
    pub async fn try_next(&mut self) -> DatabaseResult<Option<Document>> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };

        match cursor.next().await {
            Some(Ok(document)) => Ok(Some(document)),
            Some(Err(err)) => {
                self.release();
                Err(err)
            }
            None => {
                self.release();
                Ok(None)
            }
        }
    }

    /// Returns `true` once the cursor has been released.
    pub fn done(&self) -> bool {
        self.cursor.is_none()
    }

    /// The failure that ended iteration, if any.
    pub fn err(&self) -> Option<&DatabaseError> {
        self.err.as_ref()
    }

    /// Returns `true` if iteration ended because the backend timed out.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Releases the cursor and returns the failure that ended iteration, if any.
    pub fn close(&mut self) -> DatabaseResult<()> {
        self.release();

        match self.err.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn release(&mut self) {
        if self.cursor.take().is_some() {
            tracing::trace!("cursor released");
        }
    }
}

impl fmt::Debug for Iter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("done", &self.done())
            .field("err", &self.err)
            .field("timed_out", &self.timed_out)
            .finish()
    }
}
