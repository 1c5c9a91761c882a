//! A throwaway database on a shared test instance.

use std::{ops::Deref, sync::Arc};

use docport_core::{config::Config, database::Database};
use docport_mongodb::MongoDatabase;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    error::HarnessResult,
    instance::{InstanceLease, InstanceManager, Provisioner},
};

/// A uniquely named database that lives as long as one test.
///
/// Dereferences to the underlying [`MongoDatabase`].
///
/// # Example
///
/// ```ignore
/// let manager = InstanceManager::new(DockerMongoProvisioner::new(HarnessConfig::from_env()));
/// let database = TestDatabase::start(&manager).await?;
///
/// database.collection("users").insert(doc! { "_id": 1 }).await?;
/// database.close().await?;
/// ```
#[derive(Debug)]
pub struct TestDatabase<P: Provisioner> {
    database: MongoDatabase,
    lease: InstanceLease<P>,
}

impl<P: Provisioner> TestDatabase<P> {
    /// Takes a hold on the shared instance and connects to a fresh database on it.
    pub async fn start(manager: &Arc<InstanceManager<P>>) -> HarnessResult<Self> {
        let lease = manager.acquire().await?;
        let name = format!("testDb{}", Uuid::new_v4().simple());

        match MongoDatabase::connect(Config::new([lease.host()], name.as_str())).await {
            Ok(database) => {
                debug!(database = %name, host = lease.host(), "test database started");
                Ok(Self { database, lease })
            }
            Err(err) => {
                if let Err(release_err) = lease.release().await {
                    warn!(error = %release_err, "failed to release instance after connect failure");
                }
                Err(err.into())
            }
        }
    }

    pub fn database(&self) -> &MongoDatabase {
        &self.database
    }

    /// Removes every document from every non-system collection.
    pub async fn clean(&self) -> HarnessResult<()> {
        clean_collections(&self.database).await
    }

    /// Cleans and drops the database, closes the connection, and releases the instance.
    pub async fn close(self) -> HarnessResult<()> {
        let Self { database, lease } = self;

        let dropped = match clean_collections(&database).await {
            Ok(()) => database.drop_database().await.map_err(Into::into),
            Err(err) => Err(err),
        };

        // The instance is released even when cleanup failed.
        database.close().await;
        lease.release().await?;

        dropped
    }
}

async fn clean_collections(database: &MongoDatabase) -> HarnessResult<()> {
    for collection in database.collections().await? {
        if collection.name().starts_with("system.") {
            continue;
        }
        collection.clean().await?;
    }

    Ok(())
}

impl<P: Provisioner> Deref for TestDatabase<P> {
    type Target = MongoDatabase;

    fn deref(&self) -> &MongoDatabase {
        &self.database
    }
}

#[cfg(test)]
mod tests {
    use docport_core::error::DatabaseError;

    use super::*;
    use crate::{
        error::HarnessError,
        instance::{Instance, State},
        mocks::MockProvisioner,
    };

    #[tokio::test]
    async fn connect_failure_wins_over_teardown_failure() {
        let mut provisioner = MockProvisioner::new();
        provisioner.expect_provision().times(1).returning(|| {
            Ok(Instance {
                host: "127.0.0.1:1".into(),
                container: Some("c0ffee".into()),
            })
        });
        provisioner.expect_teardown().times(1).returning(|_| {
            Err(HarnessError::Teardown {
                container: "c0ffee".into(),
                output: "no such container".into(),
            })
        });

        let manager = InstanceManager::new(provisioner);
        let err = TestDatabase::start(&manager).await.unwrap_err();

        assert!(
            matches!(err, HarnessError::Database(DatabaseError::Connection { .. })),
            "expected the connect error, got {err:?}"
        );
        assert_eq!(manager.holders().await, 0);
        assert_eq!(manager.state().await, State::Terminated);
    }
}
