use async_trait::async_trait;
use bson::Document;
use docport_core::{
    error::{DatabaseError, DatabaseResult},
    index::{Index, Indexer},
};
use mongodb::{Client, Collection as DriverCollection, IndexModel, options::IndexOptions};
use tracing::{debug, error};

use crate::{
    error::driver_error,
    query::keys_document,
    session::SessionTracker,
};

fn index_model(index: &Index) -> IndexModel {
    IndexModel::builder()
        .keys(keys_document(&index.key))
        .options(
            IndexOptions::builder()
                .unique(index.unique)
                .expire_after(index.expire_after)
                .build(),
        )
        .build()
}

/// Creates indexes on one collection.
#[derive(Debug, Clone)]
pub struct MongoIndexer {
    client: Client,
    collection: DriverCollection<Document>,
    sessions: SessionTracker,
}

impl MongoIndexer {
    pub(crate) fn new(client: Client, collection: DriverCollection<Document>, sessions: SessionTracker) -> Self {
        Self {
            client,
            collection,
            sessions,
        }
    }
}

#[async_trait]
impl Indexer for MongoIndexer {
    async fn create_all(&self, indexes: Vec<Index>) -> DatabaseResult<()> {
        let session = self.client.start_session().await.map_err(driver_error)?;
        let mut session = self.sessions.lease(session);

        for index in indexes {
            if let Err(err) = self
                .collection
                .create_index(index_model(&index))
                .session(&mut *session)
                .await
            {
                error!(collection = self.collection.name(), key = ?index.key, error = %err, "could not create index");
                return Err(DatabaseError::Index {
                    key: index.key,
                    source: Box::new(driver_error(err)),
                });
            }
            debug!(collection = self.collection.name(), key = ?index.key, "index created");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bson::doc;

    use super::*;

    #[test]
    fn index_model_carries_options() {
        let model = index_model(&Index::new(["-at"]).unique().expire_after(Duration::from_secs(60)));
        let options = model.options.unwrap();

        assert_eq!(model.keys, doc! { "at": -1 });
        assert_eq!(options.unique, Some(true));
        assert_eq!(options.expire_after, Some(Duration::from_secs(60)));
    }

    #[test]
    fn plain_index_has_no_ttl() {
        let model = index_model(&Index::new(["name", "age"]));
        let options = model.options.unwrap();

        assert_eq!(model.keys, doc! { "name": 1, "age": 1 });
        assert_eq!(options.unique, Some(false));
        assert_eq!(options.expire_after, None);
    }
}
