//! Change descriptors and change results.
//!
//! A [`Change`] describes a single atomic find-and-modify request and a
//! [`ChangeInfo`] reports what a write did. Operations return
//! `Option<ChangeInfo>`: `None` means the backend had no result to report,
//! which is distinct from a result whose counts are all zero.

use bson::{Bson, Document};

/// A single atomic find-and-modify request, applied with [`Query::apply`](crate::query::Query::apply).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Change {
    /// The update to apply. Either an operator document (`$set`, ...) or a replacement.
    pub update: Document,
    /// Insert a document when nothing matches.
    pub upsert: bool,
    /// Remove the matched document instead of updating it.
    pub remove: bool,
    /// Return the document after the change instead of before it.
    pub return_new: bool,
}

impl Change {
    /// Creates a change that applies `update` to the first matching document.
    pub fn update(update: Document) -> Self {
        Self {
            update,
            ..Self::default()
        }
    }

    /// Creates a change that removes the first matching document.
    pub fn remove() -> Self {
        Self {
            remove: true,
            ..Self::default()
        }
    }

    /// Inserts a document when nothing matches.
    pub fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    /// Returns the post-image instead of the pre-image.
    pub fn return_new(mut self, return_new: bool) -> Self {
        self.return_new = return_new;
        self
    }
}

/// Counts reported by a write operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeInfo {
    /// Number of documents matched by the selector.
    pub matched: u64,
    /// Number of documents updated.
    pub updated: u64,
    /// Number of documents removed.
    pub removed: u64,
    /// Identifier of the document inserted by an upsert, if one was inserted.
    pub upserted_id: Option<Bson>,
}

/// Outcome of a find-and-modify request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applied {
    /// What the change did, if the backend reported it.
    pub info: Option<ChangeInfo>,
    /// The pre-image, or the post-image when [`Change::return_new`] was set.
    pub document: Option<Document>,
}
