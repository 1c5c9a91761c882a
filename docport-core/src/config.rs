//! Connection configuration.
//!
//! A [`Config`] describes where and how a backend should connect. It is built
//! once, validated, and handed to a backend builder which consumes it.
//!
//! # Example
//!
//! ```ignore
//! use docport::config::Config;
//! use std::time::Duration;
//!
//! let config = Config::builder()
//!     .addr("localhost:27017")
//!     .database("app")
//!     .timeout(Duration::from_secs(5))
//!     .max_retry_attempts(3)
//!     .build()?;
//! ```

use std::time::Duration;

use crate::error::{DatabaseError, DatabaseResult};

/// Dial timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Configuration used to establish a connection to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Host addresses, in order of preference.
    pub addrs: Vec<String>,
    /// Name of the database to bind to.
    pub database: String,
    /// Dial timeout.
    pub timeout: Option<Duration>,
    /// How many times a failed dial is retried. Zero means a single attempt.
    pub max_retry_attempts: u32,
    /// How long a pooled connection may stay idle before it is closed.
    pub max_idle_time: Option<Duration>,
}

impl Config {
    /// Creates a configuration for the given addresses and database name.
    pub fn new<I, S>(addrs: I, database: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addrs: addrs.into_iter().map(Into::into).collect(),
            database: database.into(),
            timeout: None,
            max_retry_attempts: 0,
            max_idle_time: None,
        }
    }

    /// Creates a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// The dial timeout, falling back to [`DEFAULT_TIMEOUT`].
    pub fn dial_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Checks that at least one non-empty address and a database name are present.
    pub fn validate(&self) -> DatabaseResult<()> {
        if self.addrs.is_empty() {
            return Err(DatabaseError::Configuration("no host addresses configured".into()));
        }
        if self.addrs.iter().any(|addr| addr.trim().is_empty()) {
            return Err(DatabaseError::Configuration("empty host address".into()));
        }
        if self.database.trim().is_empty() {
            return Err(DatabaseError::Configuration("database name must not be empty".into()));
        }

        Ok(())
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    addrs: Vec<String>,
    database: String,
    timeout: Option<Duration>,
    max_retry_attempts: u32,
    max_idle_time: Option<Duration>,
}

impl ConfigBuilder {
    /// Appends a host address.
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addrs.push(addr.into());
        self
    }

    /// Appends several host addresses.
    pub fn addrs<I, S>(mut self, addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.addrs.extend(addrs.into_iter().map(Into::into));
        self
    }

    /// Sets the database name.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Sets the dial timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how many times a failed dial is retried.
    pub fn max_retry_attempts(mut self, attempts: u32) -> Self {
        self.max_retry_attempts = attempts;
        self
    }

    /// Sets the maximum idle time of pooled connections.
    pub fn max_idle_time(mut self, idle: Duration) -> Self {
        self.max_idle_time = Some(idle);
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> DatabaseResult<Config> {
        let config = Config {
            addrs: self.addrs,
            database: self.database,
            timeout: self.timeout,
            max_retry_attempts: self.max_retry_attempts,
            max_idle_time: self.max_idle_time,
        };
        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn builder_collects_fields() {
        let config = Config::builder()
            .addr("db-1:27017")
            .addrs(["db-2:27017"])
            .database("app")
            .timeout(Duration::from_secs(5))
            .max_retry_attempts(3)
            .max_idle_time(Duration::from_millis(500))
            .build()
            .unwrap();

        assert_eq!(config.addrs, vec!["db-1:27017", "db-2:27017"]);
        assert_eq!(config.database, "app");
        assert_eq!(config.dial_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_retry_attempts, 3);
        assert_eq!(config.max_idle_time, Some(Duration::from_millis(500)));
    }

    #[test]
    fn default_timeout_applies() {
        let config = Config::new(["localhost"], "app");
        assert_eq!(config.dial_timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.max_retry_attempts, 0);
    }

    #[rstest]
    #[case(Vec::<&str>::new(), "app")]
    #[case(vec![""], "app")]
    #[case(vec!["localhost"], "")]
    #[case(vec!["localhost"], "   ")]
    fn rejects_invalid(#[case] addrs: Vec<&str>, #[case] database: &str) {
        let err = Config::new(addrs, database).validate().unwrap_err();
        assert!(matches!(err, DatabaseError::Configuration(_)));
    }
}
