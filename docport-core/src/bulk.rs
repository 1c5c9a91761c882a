//! Batched writes.
//!
//! [`Bulk`] queues writes locally; queuing performs no I/O. [`Bulk::run`]
//! hands the whole queue to the backend as one request, executed in the order
//! the writes were queued, and releases the session afterwards.

use std::fmt;

use async_trait::async_trait;
use bson::Document;

use crate::error::DatabaseResult;

/// A write queued on a [`Bulk`] batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOp {
    /// Insert a document.
    Insert(Document),
    /// Update the first document matching `selector`.
    Update { selector: Document, update: Document },
    /// Update the first document matching `selector`, inserting one if none matches.
    Upsert { selector: Document, update: Document },
}

/// Counts reported by a bulk run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkResult {
    /// Number of documents matched by queued updates.
    pub matched: u64,
    /// Number of documents modified by queued updates.
    pub modified: u64,
}

/// Backend half of a [`Bulk`] batch, owning the session leased for it.
#[async_trait]
pub trait BulkExecutor: Send {
    /// Executes the queued writes as one request.
    async fn run(&mut self, ops: Vec<BulkOp>) -> DatabaseResult<Option<BulkResult>>;
}

/// A batch of writes executed in one round trip.
pub struct Bulk {
    ops: Vec<BulkOp>,
    executor: Box<dyn BulkExecutor>,
}

impl Bulk {
    /// Creates an empty batch executed by `executor`.
    pub fn new(executor: Box<dyn BulkExecutor>) -> Self {
        Self {
            ops: Vec::new(),
            executor,
        }
    }

    /// Queues documents for insertion.
    pub fn insert<I>(&mut self, documents: I) -> &mut Self
    where
        I: IntoIterator<Item = Document>,
    {
        self.ops.extend(documents.into_iter().map(BulkOp::Insert));
        self
    }

    /// Queues an update of the first document matching `selector`.
    pub fn update(&mut self, selector: Document, update: Document) -> &mut Self {
        self.ops.push(BulkOp::Update { selector, update });
        self
    }

    /// Queues an upsert of the first document matching `selector`.
    pub fn upsert(&mut self, selector: Document, update: Document) -> &mut Self {
        self.ops.push(BulkOp::Upsert { selector, update });
        self
    }

    /// The writes queued so far.
    pub fn ops(&self) -> &[BulkOp] {
        &self.ops
    }

    /// Runs the queued writes and releases the session.
    pub async fn run(mut self) -> DatabaseResult<Option<BulkResult>> {
        let ops = std::mem::take(&mut self.ops);
        self.executor.run(ops).await
    }
}

impl fmt::Debug for Bulk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bulk").field("ops", &self.ops).finish_non_exhaustive()
    }
}
