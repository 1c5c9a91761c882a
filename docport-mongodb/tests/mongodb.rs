//! Tests against a live MongoDB instance.
//!
//! Instance tests start a `mongo` container through the docker CLI, or use
//! the server named by `TEST_DB_HOST`. Run them with
//! `cargo test -p docport-mongodb -- --ignored`.

use std::{
    sync::{Arc, LazyLock},
    time::{Duration, Instant},
};

use bson::{Bson, doc};
use docport_core::{
    change::{Change, ChangeInfo},
    config::Config,
    database::Database,
    document::to_document,
    error::DatabaseError,
    index::Index,
};
use docport_mongodb::MongoDatabase;
use docport_testkit::{DockerMongoProvisioner, HarnessConfig, InstanceManager, TestDatabase};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

static INSTANCE: LazyLock<Arc<InstanceManager<DockerMongoProvisioner>>> =
    LazyLock::new(|| InstanceManager::new(DockerMongoProvisioner::new(HarnessConfig::from_env())));

async fn start() -> TestDatabase<DockerMongoProvisioner> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    TestDatabase::start(&INSTANCE)
        .await
        .expect("test instance should be provisioned")
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Person {
    #[serde(rename = "_id")]
    id: i32,
    name: String,
    age: i32,
}

fn person(id: i32, name: &str, age: i32) -> Person {
    Person {
        id,
        name: name.into(),
        age,
    }
}

#[tokio::test]
async fn unreachable_host_fails_after_all_attempts() {
    let config = Config::builder()
        .addr("bad-host")
        .database("app")
        .timeout(Duration::from_millis(200))
        .max_retry_attempts(2)
        .build()
        .unwrap();

    let started = Instant::now();
    let err = MongoDatabase::connect(config).await.unwrap_err();

    match err {
        DatabaseError::Connection { addrs, attempts, .. } => {
            assert_eq!(addrs, vec!["bad-host".to_string()]);
            assert_eq!(attempts, 3);
        }
        other => panic!("expected a connection error, got {other:?}"),
    }
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires docker or TEST_DB_HOST"]
async fn concurrent_inserts_release_every_session() {
    let database = start().await;

    let inserts = (0..32).map(|id| {
        let people = database.collection("people");
        async move { people.insert(to_document(&person(id, "p", id)).unwrap()).await }
    });
    for result in futures::future::join_all(inserts).await {
        result.unwrap();
    }

    assert_eq!(database.leased_sessions(), 0);
    let count = database.collection("people").find(doc! {}).await.unwrap().count().await.unwrap();
    assert_eq!(count, 32);
    assert_eq!(database.leased_sessions(), 0);

    database.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires docker or TEST_DB_HOST"]
async fn refined_iteration_releases_once() {
    let database = start().await;
    let people = database.collection("people");
    for (id, name) in ["dave", "alice", "carol", "bob"].into_iter().enumerate() {
        people.insert(to_document(&person(id as i32, name, 30)).unwrap()).await.unwrap();
    }

    let mut iter = people
        .find(doc! {})
        .await
        .unwrap()
        .sort(["name"])
        .limit(3)
        .iter()
        .await
        .unwrap();
    assert_eq!(database.leased_sessions(), 1);

    let mut names = Vec::new();
    while let Some(person) = iter.next_as::<Person>().await {
        names.push(person.unwrap().name);
    }

    assert_eq!(names, ["alice", "bob", "carol"]);
    assert!(iter.done());
    assert_eq!(database.leased_sessions(), 0);
    assert!(iter.next().await.is_none());
    assert_eq!(database.leased_sessions(), 0);
    iter.close().unwrap();

    database.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires docker or TEST_DB_HOST"]
async fn remove_all_on_empty_collection_reports_zero() {
    let database = start().await;

    let info = database.collection("empty").remove_all(None).await.unwrap();
    assert_eq!(info, Some(ChangeInfo::default()));
    assert_eq!(info.map(|info| info.removed), Some(0));

    database.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires docker or TEST_DB_HOST"]
async fn writes_report_not_found() {
    let database = start().await;
    let people = database.collection("people");

    let err = people
        .update(doc! { "_id": 404 }, doc! { "$set": { "age": 1 } })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(people.remove_id(Bson::Int32(404)).await.unwrap_err().is_not_found());
    assert!(people.find_id(Bson::Int32(404)).await.unwrap().one().await.unwrap().is_none());
    assert_eq!(database.leased_sessions(), 0);

    database.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires docker or TEST_DB_HOST"]
async fn updates_and_upserts() {
    let database = start().await;
    let people = database.collection("people");
    people.insert(to_document(&person(1, "alice", 30)).unwrap()).await.unwrap();

    people.update(doc! { "_id": 1 }, doc! { "$inc": { "age": 1 } }).await.unwrap();
    people
        .update(doc! { "_id": 1 }, to_document(&person(1, "alicia", 31)).unwrap())
        .await
        .unwrap();
    let stored: Option<Person> = people.find_id(Bson::Int32(1)).await.unwrap().one_as().await.unwrap();
    assert_eq!(stored, Some(person(1, "alicia", 31)));

    let inserted = people
        .upsert(doc! { "_id": 2 }, doc! { "$set": { "name": "bob", "age": 40 } })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(inserted.upserted_id, Some(Bson::Int32(2)));

    let updated = people
        .update_all(doc! {}, doc! { "$set": { "active": true } })
        .await
        .unwrap()
        .unwrap();
    assert_eq!((updated.matched, updated.updated), (2, 2));

    database.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires docker or TEST_DB_HOST"]
async fn apply_find_and_modify() {
    let database = start().await;
    let counters = database.collection("counters");
    counters.insert(doc! { "_id": "jobs", "n": 1 }).await.unwrap();

    let applied = counters
        .find_id("jobs".into())
        .await
        .unwrap()
        .apply(Change::update(doc! { "$inc": { "n": 1 } }).return_new(true))
        .await
        .unwrap();
    assert_eq!(applied.document.unwrap().get_i32("n").unwrap(), 2);
    let info = applied.info.unwrap();
    assert_eq!((info.matched, info.updated), (1, 1));

    let applied = counters
        .find_id("mail".into())
        .await
        .unwrap()
        .apply(Change::update(doc! { "$set": { "n": 0 } }).upsert(true))
        .await
        .unwrap();
    assert_eq!(applied.info.unwrap().upserted_id, Some(Bson::String("mail".into())));

    let removed = counters
        .find_id("jobs".into())
        .await
        .unwrap()
        .apply(Change::remove())
        .await
        .unwrap();
    assert_eq!(removed.info.unwrap().removed, 1);

    let err = counters
        .find_id("jobs".into())
        .await
        .unwrap()
        .apply(Change::remove())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(database.leased_sessions(), 0);

    database.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires docker or TEST_DB_HOST"]
async fn bulk_runs_in_queue_order() {
    let database = start().await;
    let people = database.collection("people");

    let mut bulk = people.bulk().await.unwrap();
    bulk.insert([doc! { "_id": 1, "n": 0 }, doc! { "_id": 2, "n": 0 }])
        .update(doc! { "_id": 1 }, doc! { "$inc": { "n": 1 } })
        .upsert(doc! { "_id": 3 }, doc! { "$set": { "n": 9 } });
    assert_eq!(database.leased_sessions(), 1);

    let result = bulk.run().await.unwrap().unwrap();
    assert_eq!(result.matched, 1);
    assert_eq!(result.modified, 1);
    assert_eq!(database.leased_sessions(), 0);

    let total = people.find(doc! {}).await.unwrap().count().await.unwrap();
    assert_eq!(total, 3);

    database.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires docker or TEST_DB_HOST"]
async fn queries_and_pipelines() {
    let database = start().await;
    let people = database.collection("people");
    for (id, (name, age)) in [("ann", 20), ("ben", 35), ("cat", 35)].into_iter().enumerate() {
        people.insert(to_document(&person(id as i32, name, age)).unwrap()).await.unwrap();
    }

    let oldest: Vec<Person> = people
        .find(doc! {})
        .await
        .unwrap()
        .sort(["-age", "-name"])
        .skip(1)
        .all_as()
        .await
        .unwrap();
    assert_eq!(oldest.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), ["ben", "ann"]);

    let unlimited = people.find(doc! {}).await.unwrap().limit(0).count().await.unwrap();
    assert_eq!(unlimited, 3);
    let everyone = people.find(doc! {}).await.unwrap().limit(0).all().await.unwrap();
    assert_eq!(everyone.len(), 3);

    let mut ages = people.find(doc! {}).await.unwrap().distinct("age").await.unwrap();
    ages.sort_by_key(|age| age.as_i32());
    assert_eq!(ages, [Bson::Int32(20), Bson::Int32(35)]);

    let projected = people
        .find(doc! { "name": "ann" })
        .await
        .unwrap()
        .select(doc! { "_id": 0, "name": 1 })
        .one()
        .await
        .unwrap();
    assert_eq!(projected, Some(doc! { "name": "ann" }));

    let grouped = people
        .pipe(vec![
            doc! { "$group": { "_id": "$age", "count": { "$sum": 1 } } },
            doc! { "$sort": { "_id": 1 } },
        ])
        .await
        .unwrap()
        .all()
        .await
        .unwrap();
    assert_eq!(grouped, [doc! { "_id": 20, "count": 1 }, doc! { "_id": 35, "count": 2 }]);
    assert_eq!(database.leased_sessions(), 0);

    database.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires docker or TEST_DB_HOST"]
async fn indexes_and_clean() {
    let database = start().await;
    database
        .indexer("people")
        .create_all(vec![
            Index::new(["name"]).unique(),
            Index::new(["-seen"]).expire_after(Duration::from_secs(3600)),
        ])
        .await
        .unwrap();

    let people = database.collection("people");
    people.insert(doc! { "_id": 1, "name": "ann" }).await.unwrap();
    let duplicate = people.insert(doc! { "_id": 2, "name": "ann" }).await.unwrap_err();
    assert!(matches!(duplicate, DatabaseError::Operation(_)));

    database.collection("other").insert(doc! { "_id": 1 }).await.unwrap();
    database.clean().await.unwrap();

    for collection in database.collections().await.unwrap() {
        let remaining = collection.find(doc! {}).await.unwrap().count().await.unwrap();
        assert_eq!(remaining, 0, "{} should be empty", collection.name());
    }

    let err = database
        .indexer("people")
        .create_all(vec![Index::new(["name"])])
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Index { .. }));

    database.close().await.unwrap();
}
