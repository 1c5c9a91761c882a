//! Convenient re-exports of commonly used types from docport.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docport::prelude::*;
//! ```
//!
//! This provides access to:
//! - Database, collection and indexer traits
//! - Query, cursor, batch and pipeline handles
//! - Change descriptors and write results
//! - Configuration and document conversion helpers
//! - Error types

pub use docport_core::{
    bulk::{Bulk, BulkResult},
    change::{Applied, Change, ChangeInfo},
    collection::Collection,
    config::{Config, ConfigBuilder},
    database::{Database, DatabaseBuilder},
    document::{from_document, to_document},
    error::{DatabaseError, DatabaseResult},
    index::{Index, Indexer},
    iter::Iter,
    pipe::Pipe,
    query::Query,
};
