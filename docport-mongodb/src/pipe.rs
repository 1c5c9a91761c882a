use async_trait::async_trait;
use bson::Document;
use docport_core::{error::DatabaseResult, pipe::PipeExecutor};
use futures::TryStreamExt;
use mongodb::Collection as DriverCollection;

use crate::{error::driver_error, session::SessionLease};

/// Runs one aggregation on a leased session.
pub(crate) struct MongoPipe {
    collection: DriverCollection<Document>,
    session: SessionLease,
}

impl MongoPipe {
    pub(crate) fn new(collection: DriverCollection<Document>, session: SessionLease) -> Self {
        Self { collection, session }
    }
}

#[async_trait]
impl PipeExecutor for MongoPipe {
    async fn all(&mut self, pipeline: Vec<Document>) -> DatabaseResult<Vec<Document>> {
        let mut cursor = self
            .collection
            .aggregate(pipeline)
            .session(&mut *self.session)
            .await
            .map_err(driver_error)?;

        cursor
            .stream(&mut self.session)
            .try_collect()
            .await
            .map_err(driver_error)
    }

    async fn one(&mut self, pipeline: Vec<Document>) -> DatabaseResult<Option<Document>> {
        let mut cursor = self
            .collection
            .aggregate(pipeline)
            .session(&mut *self.session)
            .await
            .map_err(driver_error)?;

        cursor.next(&mut self.session).await.transpose().map_err(driver_error)
    }
}
