//! Conversion of driver write results into the neutral result types.
//!
//! The driver reports counts in several shapes (update and delete results,
//! the `lastErrorObject` of a `findAndModify` reply, bulk write summaries).
//! They are first captured in [`DriverChange`] / [`DriverBulk`], then copied
//! into [`ChangeInfo`] / [`BulkResult`]. An absent native result stays absent.

use bson::{Bson, Document};
use docport_core::{bulk::BulkResult, change::ChangeInfo};
use mongodb::results::{DeleteResult, SummaryBulkWriteResult, UpdateResult};

/// Write counts as reported by the driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverChange {
    pub matched: u64,
    pub modified: u64,
    pub removed: u64,
    pub upserted_id: Option<Bson>,
}

impl DriverChange {
    /// Reads the counts out of a `findAndModify` `lastErrorObject`.
    pub fn from_last_error_object(status: &Document, remove: bool) -> Self {
        let n = status.get("n").and_then(count).unwrap_or(0);

        if remove {
            return Self {
                matched: n,
                removed: n,
                ..Self::default()
            };
        }

        let updated_existing = status.get_bool("updatedExisting").unwrap_or(false);
        match status.get("upserted") {
            Some(id) if !updated_existing => Self {
                upserted_id: Some(id.clone()),
                ..Self::default()
            },
            _ => Self {
                matched: n,
                modified: n,
                ..Self::default()
            },
        }
    }
}

impl From<UpdateResult> for DriverChange {
    fn from(result: UpdateResult) -> Self {
        Self {
            matched: result.matched_count,
            modified: result.modified_count,
            removed: 0,
            upserted_id: result.upserted_id,
        }
    }
}

impl From<DeleteResult> for DriverChange {
    fn from(result: DeleteResult) -> Self {
        Self {
            matched: result.deleted_count,
            modified: 0,
            removed: result.deleted_count,
            upserted_id: None,
        }
    }
}

/// Bulk write counts as reported by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverBulk {
    pub matched: u64,
    pub modified: u64,
}

impl From<SummaryBulkWriteResult> for DriverBulk {
    fn from(result: SummaryBulkWriteResult) -> Self {
        Self {
            matched: u64::try_from(result.matched_count).unwrap_or_default(),
            modified: u64::try_from(result.modified_count).unwrap_or_default(),
        }
    }
}

pub fn adapt_change_info(native: Option<DriverChange>) -> Option<ChangeInfo> {
    native.map(|native| ChangeInfo {
        matched: native.matched,
        updated: native.modified,
        removed: native.removed,
        upserted_id: native.upserted_id,
    })
}

pub fn adapt_bulk_result(native: Option<DriverBulk>) -> Option<BulkResult> {
    native.map(|native| BulkResult {
        matched: native.matched,
        modified: native.modified,
    })
}

/// Reads a server-reported count, which may arrive as any numeric type.
pub(crate) fn count(value: &Bson) -> Option<u64> {
    match value {
        Bson::Int32(n) => u64::try_from(*n).ok(),
        Bson::Int64(n) => u64::try_from(*n).ok(),
        Bson::Double(n) if *n >= 0.0 => Some(*n as u64),
        _ => None,
    }
}
