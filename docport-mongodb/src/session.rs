//! Session leases.
//!
//! Every operation borrows its own [`ClientSession`] from the shared client
//! and hands it back by dropping the [`Lease`]. The [`SessionTracker`] counts
//! outstanding leases so the number of in-flight sessions can be observed.

use std::{
    ops::{Deref, DerefMut},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use mongodb::ClientSession;
use tracing::trace;

/// A session leased for exactly one operation.
pub(crate) type SessionLease = Lease<ClientSession>;

/// Counts leases that have not been released yet. Clones share the count.
#[derive(Debug, Clone, Default)]
pub(crate) struct SessionTracker {
    leased: Arc<AtomicUsize>,
}

impl SessionTracker {
    /// Wraps `inner` in a lease counted by this tracker.
    pub(crate) fn lease<T>(&self, inner: T) -> Lease<T> {
        let leased = self.leased.fetch_add(1, Ordering::AcqRel) + 1;
        trace!(leased, "session leased");

        Lease {
            inner,
            tracker: self.clone(),
        }
    }

    /// Number of leases currently outstanding.
    pub(crate) fn leased(&self) -> usize {
        self.leased.load(Ordering::Acquire)
    }
}

/// A value owned by one operation; dropping it releases the lease.
#[derive(Debug)]
pub(crate) struct Lease<T> {
    inner: T,
    tracker: SessionTracker,
}

impl<T> Deref for Lease<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for Lease<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T> Drop for Lease<T> {
    fn drop(&mut self) {
        let leased = self.tracker.leased.fetch_sub(1, Ordering::AcqRel) - 1;
        trace!(leased, "session released");
    }
}
