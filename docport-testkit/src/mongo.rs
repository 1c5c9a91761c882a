//! Disposable MongoDB instances.

use async_trait::async_trait;
use docport_core::{config::Config, database::Database};
use docport_mongodb::MongoDatabase;
use tracing::{info, warn};

use crate::{
    docker,
    error::{HarnessError, HarnessResult},
    instance::{Instance, Provisioner},
};

/// Environment variable naming an externally managed instance.
pub const HOST_VAR: &str = "TEST_DB_HOST";

pub const DEFAULT_IMAGE: &str = "mongo";

/// How many times the readiness ping is retried after the first attempt.
pub const DEFAULT_READINESS_RETRIES: u32 = 10;

/// Harness configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Image started when no host override is set.
    pub image: String,
    /// Externally managed instance; no container is started when set.
    pub host: Option<String>,
    pub readiness_retries: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            host: None,
            readiness_retries: DEFAULT_READINESS_RETRIES,
        }
    }
}

impl HarnessConfig {
    /// Reads [`HOST_VAR`] once; an empty value counts as unset.
    pub fn from_env() -> Self {
        let host = std::env::var(HOST_VAR)
            .ok()
            .filter(|host| !host.trim().is_empty());

        Self {
            host,
            ..Self::default()
        }
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn readiness_retries(mut self, retries: u32) -> Self {
        self.readiness_retries = retries;
        self
    }

    /// Whether instances come from a container runtime rather than [`HOST_VAR`].
    pub fn uses_containers(&self) -> bool {
        self.host.is_none()
    }
}

/// Provisions MongoDB through the `docker` CLI, or binds to the configured host.
#[derive(Debug, Clone)]
pub struct DockerMongoProvisioner {
    config: HarnessConfig,
}

impl DockerMongoProvisioner {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Pings `host` with linear backoff until it answers.
    async fn wait_ready(&self, host: &str) -> HarnessResult<()> {
        let mut config = Config::new([host], "admin");
        config.max_retry_attempts = self.config.readiness_retries;

        match MongoDatabase::connect(config).await {
            Ok(database) => {
                database.close().await;
                Ok(())
            }
            Err(source) => Err(HarnessError::NotReady {
                host: host.to_string(),
                source,
            }),
        }
    }
}

#[async_trait]
impl Provisioner for DockerMongoProvisioner {
    async fn provision(&self) -> HarnessResult<Instance> {
        if let Some(host) = &self.config.host {
            info!(host = %host, "using externally managed instance");
            return Ok(Instance {
                host: host.clone(),
                container: None,
            });
        }

        docker::ensure_image(&self.config.image).await?;
        let container = docker::run(&self.config.image).await?;

        let ready = match docker::inspect_ip(&container).await {
            Ok(host) => self.wait_ready(&host).await.map(|()| host),
            Err(err) => Err(err),
        };

        match ready {
            Ok(host) => Ok(Instance {
                host,
                container: Some(container),
            }),
            Err(err) => {
                if let Err(kill_err) = docker::kill(&container).await {
                    warn!(container = %container, error = %kill_err, "failed to remove unusable container");
                }
                Err(err)
            }
        }
    }

    async fn teardown(&self, instance: Instance) -> HarnessResult<()> {
        match instance.container {
            Some(container) => docker::kill(&container).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.image, "mongo");
        assert_eq!(config.host, None);
        assert_eq!(config.readiness_retries, DEFAULT_READINESS_RETRIES);
        assert!(config.uses_containers());
    }

    #[test]
    fn host_override_skips_containers() {
        let config = HarnessConfig::default().host("db.internal:27017").readiness_retries(2);
        assert!(!config.uses_containers());
        assert_eq!(config.readiness_retries, 2);
    }

    #[tokio::test]
    async fn external_host_is_provisioned_without_docker() {
        let provisioner = DockerMongoProvisioner::new(HarnessConfig::default().host("db.internal:27017"));

        let instance = provisioner.provision().await.unwrap();
        assert_eq!(
            instance,
            Instance {
                host: "db.internal:27017".into(),
                container: None,
            }
        );
        provisioner.teardown(instance).await.unwrap();
    }
}
