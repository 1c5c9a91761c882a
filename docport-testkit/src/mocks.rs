//! mockall test doubles for every capability trait.
//!
//! Each mock records the calls it receives and answers with canned values set
//! up through its `expect_*` methods; unmet expectations fail the test when
//! the mock is dropped.
//!
//! ```ignore
//! use docport_testkit::mocks::MockCollection;
//!
//! let mut users = MockCollection::new();
//! users
//!     .expect_remove_all()
//!     .withf(|selector| selector.is_none())
//!     .times(1)
//!     .returning(|_| Ok(Some(ChangeInfo::default())));
//!
//! purge(&users).await?;
//! ```

use async_trait::async_trait;
use bson::{Bson, Document};
use docport_core::{
    bulk::{Bulk, BulkExecutor, BulkOp, BulkResult},
    change::{Applied, Change, ChangeInfo},
    collection::Collection as CollectionTrait,
    database::Database as DatabaseTrait,
    error::DatabaseResult,
    index::{Index, Indexer as IndexerTrait},
    iter::Cursor as CursorTrait,
    pipe::{Pipe, PipeExecutor},
    query::{Query, QueryExecutor, QuerySpec},
};
use mockall::mock;
use rstest::fixture;

use crate::{
    error::HarnessResult,
    instance::{Instance, Provisioner as ProvisionerTrait},
};

mock! {
    pub Database {}

    #[async_trait]
    impl DatabaseTrait for Database {
        async fn ping(&self) -> DatabaseResult<()>;
        async fn close(&self);
        fn collection(&self, name: &str) -> Box<dyn CollectionTrait>;
        async fn collections(&self) -> DatabaseResult<Vec<Box<dyn CollectionTrait>>>;
        fn indexer(&self, collection: &str) -> Box<dyn IndexerTrait>;
        async fn drop_database(&self) -> DatabaseResult<()>;
    }
}

mock! {
    pub Collection {}

    #[async_trait]
    impl CollectionTrait for Collection {
        fn name(&self) -> &str;
        async fn find(&self, criteria: Document) -> DatabaseResult<Query>;
        async fn find_id(&self, id: Bson) -> DatabaseResult<Query>;
        async fn insert(&self, document: Document) -> DatabaseResult<()>;
        async fn update(&self, selector: Document, update: Document) -> DatabaseResult<()>;
        async fn update_all(&self, selector: Document, update: Document) -> DatabaseResult<Option<ChangeInfo>>;
        async fn upsert(&self, selector: Document, update: Document) -> DatabaseResult<Option<ChangeInfo>>;
        async fn remove(&self, selector: Document) -> DatabaseResult<()>;
        async fn remove_id(&self, id: Bson) -> DatabaseResult<()>;
        async fn remove_all(&self, selector: Option<Document>) -> DatabaseResult<Option<ChangeInfo>>;
        async fn bulk(&self) -> DatabaseResult<Bulk>;
        async fn pipe(&self, pipeline: Vec<Document>) -> DatabaseResult<Pipe>;
        async fn clean(&self) -> DatabaseResult<()>;
    }
}

mock! {
    pub Indexer {}

    #[async_trait]
    impl IndexerTrait for Indexer {
        async fn create_all(&self, indexes: Vec<Index>) -> DatabaseResult<()>;
    }
}

mock! {
    pub QueryExecutor {}

    #[async_trait]
    impl QueryExecutor for QueryExecutor {
        async fn all(&mut self, spec: &QuerySpec) -> DatabaseResult<Vec<Document>>;
        async fn one(&mut self, spec: &QuerySpec) -> DatabaseResult<Option<Document>>;
        async fn count(&mut self, spec: &QuerySpec) -> DatabaseResult<u64>;
        async fn distinct(&mut self, key: &str, spec: &QuerySpec) -> DatabaseResult<Vec<Bson>>;
        async fn apply(&mut self, change: Change, spec: &QuerySpec) -> DatabaseResult<Applied>;
        async fn iter(&mut self, spec: &QuerySpec) -> DatabaseResult<Box<dyn CursorTrait>>;
    }
}

mock! {
    pub Cursor {}

    #[async_trait]
    impl CursorTrait for Cursor {
        async fn next(&mut self) -> Option<DatabaseResult<Document>>;
    }
}

mock! {
    pub BulkExecutor {}

    #[async_trait]
    impl BulkExecutor for BulkExecutor {
        async fn run(&mut self, ops: Vec<BulkOp>) -> DatabaseResult<Option<BulkResult>>;
    }
}

mock! {
    pub PipeExecutor {}

    #[async_trait]
    impl PipeExecutor for PipeExecutor {
        async fn all(&mut self, pipeline: Vec<Document>) -> DatabaseResult<Vec<Document>>;
        async fn one(&mut self, pipeline: Vec<Document>) -> DatabaseResult<Option<Document>>;
    }
}

mock! {
    pub Provisioner {}

    #[async_trait]
    impl ProvisionerTrait for Provisioner {
        async fn provision(&self) -> HarnessResult<Instance>;
        async fn teardown(&self, instance: Instance) -> HarnessResult<()>;
    }
}

impl std::fmt::Debug for MockProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvisioner").finish_non_exhaustive()
    }
}

/// A database mock that answers `ping` successfully.
#[fixture]
pub fn mock_database() -> MockDatabase {
    let mut database = MockDatabase::new();
    database.expect_ping().returning(|| Ok(()));
    database
}

/// A collection mock named `test`.
#[fixture]
pub fn mock_collection() -> MockCollection {
    let mut collection = MockCollection::new();
    collection.expect_name().return_const("test".to_string());
    collection
}
