use async_trait::async_trait;
use bson::{Bson, Document, doc};
use docport_core::{
    bulk::Bulk,
    change::ChangeInfo,
    collection::Collection,
    document::id_selector,
    error::{DatabaseError, DatabaseResult},
    pipe::Pipe,
    query::Query,
};
use mongodb::{Client, Collection as DriverCollection, Database as DriverDatabase, results::UpdateResult};
use tracing::debug;

use crate::{
    adapt::{DriverChange, adapt_change_info},
    bulk::{MongoBulk, is_replacement},
    error::driver_error,
    pipe::MongoPipe,
    query::MongoQuery,
    session::{SessionLease, SessionTracker},
};

/// A MongoDB collection.
///
/// Each operation leases a fresh session from the client and releases it
/// when the operation (or the handle it returns) is done.
#[derive(Debug, Clone)]
pub struct MongoCollection {
    client: Client,
    database: DriverDatabase,
    collection: DriverCollection<Document>,
    sessions: SessionTracker,
}

impl MongoCollection {
    pub(crate) fn new(client: Client, database: DriverDatabase, name: &str, sessions: SessionTracker) -> Self {
        Self {
            collection: database.collection(name),
            client,
            database,
            sessions,
        }
    }

    async fn refresh(&self) -> DatabaseResult<SessionLease> {
        let session = self.client.start_session().await.map_err(driver_error)?;
        Ok(self.sessions.lease(session))
    }

    async fn update_one(&self, selector: Document, update: Document, upsert: bool) -> DatabaseResult<UpdateResult> {
        let mut session = self.refresh().await?;

        let result = if is_replacement(&update) {
            self.collection
                .replace_one(selector, update)
                .upsert(upsert)
                .session(&mut *session)
                .await
        } else {
            self.collection
                .update_one(selector, update)
                .upsert(upsert)
                .session(&mut *session)
                .await
        };

        result.map_err(driver_error)
    }

    fn not_found(&self) -> DatabaseError {
        DatabaseError::NotFound(self.name().to_string())
    }
}

#[async_trait]
impl Collection for MongoCollection {
    fn name(&self) -> &str {
        self.collection.name()
    }

    async fn find(&self, criteria: Document) -> DatabaseResult<Query> {
        let session = self.refresh().await?;
        let executor = MongoQuery::new(self.database.clone(), self.collection.clone(), session);

        Ok(Query::new(criteria, Box::new(executor)))
    }

    async fn find_id(&self, id: Bson) -> DatabaseResult<Query> {
        self.find(id_selector(id)).await
    }

    async fn insert(&self, document: Document) -> DatabaseResult<()> {
        let mut session = self.refresh().await?;
        self.collection
            .insert_one(document)
            .session(&mut *session)
            .await
            .map_err(driver_error)?;

        Ok(())
    }

    async fn update(&self, selector: Document, update: Document) -> DatabaseResult<()> {
        let result = self.update_one(selector, update, false).await?;
        if result.matched_count == 0 {
            return Err(self.not_found());
        }

        Ok(())
    }

    async fn update_all(&self, selector: Document, update: Document) -> DatabaseResult<Option<ChangeInfo>> {
        let mut session = self.refresh().await?;
        let result = self
            .collection
            .update_many(selector, update)
            .session(&mut *session)
            .await
            .map_err(driver_error)?;

        Ok(adapt_change_info(Some(DriverChange::from(result))))
    }

    async fn upsert(&self, selector: Document, update: Document) -> DatabaseResult<Option<ChangeInfo>> {
        let result = self.update_one(selector, update, true).await?;

        Ok(adapt_change_info(Some(DriverChange::from(result))))
    }

    async fn remove(&self, selector: Document) -> DatabaseResult<()> {
        let mut session = self.refresh().await?;
        let result = self
            .collection
            .delete_one(selector)
            .session(&mut *session)
            .await
            .map_err(driver_error)?;

        if result.deleted_count == 0 {
            return Err(self.not_found());
        }

        Ok(())
    }

    async fn remove_id(&self, id: Bson) -> DatabaseResult<()> {
        self.remove(id_selector(id)).await
    }

    async fn remove_all(&self, selector: Option<Document>) -> DatabaseResult<Option<ChangeInfo>> {
        let mut session = self.refresh().await?;
        let result = self
            .collection
            .delete_many(selector.unwrap_or_default())
            .session(&mut *session)
            .await
            .map_err(driver_error)?;

        Ok(adapt_change_info(Some(DriverChange::from(result))))
    }

    async fn bulk(&self) -> DatabaseResult<Bulk> {
        let session = self.refresh().await?;
        let executor = MongoBulk::new(self.client.clone(), self.collection.namespace(), session);

        Ok(Bulk::new(Box::new(executor)))
    }

    async fn pipe(&self, pipeline: Vec<Document>) -> DatabaseResult<Pipe> {
        let session = self.refresh().await?;

        Ok(Pipe::new(pipeline, Box::new(MongoPipe::new(self.collection.clone(), session))))
    }

    async fn clean(&self) -> DatabaseResult<()> {
        let mut session = self.refresh().await?;
        let result = self
            .collection
            .delete_many(doc! {})
            .session(&mut *session)
            .await
            .map_err(driver_error)?;
        debug!(collection = self.name(), removed = result.deleted_count, "collection cleaned");

        Ok(())
    }
}
