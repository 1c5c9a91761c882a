//! Test support for docport.
//!
//! This crate provides:
//!
//! - **Test doubles** ([`mocks`]) - mockall mocks for every capability trait, plus rstest fixtures
//! - **Ephemeral instances** ([`instance`]) - A reference-counted manager that provisions one disposable instance per test run
//! - **MongoDB provisioning** ([`mongo`]) - Container-backed or externally provided MongoDB instances
//! - **Docker CLI helpers** ([`docker`]) - `images`, `pull`, `run`, `inspect` and `kill`
//! - **Test databases** ([`database`]) - Uniquely named databases cleaned and dropped after each test
//!
//! # Example
//!
//! ```ignore
//! use std::sync::{Arc, LazyLock};
//!
//! use docport_testkit::{DockerMongoProvisioner, HarnessConfig, InstanceManager, TestDatabase};
//!
//! static INSTANCE: LazyLock<Arc<InstanceManager<DockerMongoProvisioner>>> =
//!     LazyLock::new(|| InstanceManager::new(DockerMongoProvisioner::new(HarnessConfig::from_env())));
//!
//! #[tokio::test]
//! async fn inserts() {
//!     let database = TestDatabase::start(&INSTANCE).await.unwrap();
//!     // ...
//!     database.close().await.unwrap();
//! }
//! ```

pub mod database;
pub mod docker;
pub mod error;
pub mod instance;
pub mod mocks;
pub mod mongo;

pub use database::TestDatabase;
pub use error::{HarnessError, HarnessResult};
pub use instance::{Instance, InstanceLease, InstanceManager, Provisioner, State};
pub use mongo::{DockerMongoProvisioner, HarnessConfig};
