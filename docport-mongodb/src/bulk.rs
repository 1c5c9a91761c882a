use async_trait::async_trait;
use bson::Document;
use docport_core::{
    bulk::{BulkExecutor, BulkOp, BulkResult},
    error::DatabaseResult,
};
use mongodb::{
    Client, Namespace,
    options::{InsertOneModel, ReplaceOneModel, UpdateModifications, UpdateOneModel, WriteModel},
};
use tracing::debug;

use crate::{
    adapt::{DriverBulk, adapt_bulk_result},
    error::driver_error,
    session::SessionLease,
};

/// Whether `update` replaces the whole document rather than applying operators.
pub(crate) fn is_replacement(update: &Document) -> bool {
    !update.keys().next().is_some_and(|key| key.starts_with('$'))
}

fn write_model(namespace: &Namespace, op: BulkOp) -> WriteModel {
    let (selector, update, upsert) = match op {
        BulkOp::Insert(document) => {
            return WriteModel::InsertOne(
                InsertOneModel::builder()
                    .namespace(namespace.clone())
                    .document(document)
                    .build(),
            );
        }
        BulkOp::Update { selector, update } => (selector, update, false),
        BulkOp::Upsert { selector, update } => (selector, update, true),
    };

    if is_replacement(&update) {
        WriteModel::ReplaceOne(
            ReplaceOneModel::builder()
                .namespace(namespace.clone())
                .filter(selector)
                .replacement(update)
                .upsert(upsert)
                .build(),
        )
    } else {
        WriteModel::UpdateOne(
            UpdateOneModel::builder()
                .namespace(namespace.clone())
                .filter(selector)
                .update(UpdateModifications::Document(update))
                .upsert(upsert)
                .build(),
        )
    }
}

/// Sends a queued batch as one ordered `bulkWrite`.
pub(crate) struct MongoBulk {
    client: Client,
    namespace: Namespace,
    session: SessionLease,
}

impl MongoBulk {
    pub(crate) fn new(client: Client, namespace: Namespace, session: SessionLease) -> Self {
        Self {
            client,
            namespace,
            session,
        }
    }
}

#[async_trait]
impl BulkExecutor for MongoBulk {
    async fn run(&mut self, ops: Vec<BulkOp>) -> DatabaseResult<Option<BulkResult>> {
        if ops.is_empty() {
            return Ok(Some(BulkResult::default()));
        }

        let queued = ops.len();
        let models = ops
            .into_iter()
            .map(|op| write_model(&self.namespace, op))
            .collect::<Vec<_>>();

        let result = self
            .client
            .bulk_write(models)
            .ordered(true)
            .session(&mut *self.session)
            .await
            .map_err(driver_error)?;
        debug!(namespace = %self.namespace, queued, "bulk write completed");

        Ok(adapt_bulk_result(Some(DriverBulk::from(result))))
    }
}
