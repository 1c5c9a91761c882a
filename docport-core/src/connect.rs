//! Connection establishment with linear retry backoff.
//!
//! [`establish`] drives a backend-provided dial function until it succeeds or
//! the retry budget in [`Config`] is spent. Retry `k` is preceded by a sleep
//! of `k` backoff units, so three retries wait 1, 2 and 3 units.

use std::{future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{BoxError, DatabaseError, DatabaseResult},
};

/// Delay unit of the linear backoff between dial attempts.
pub const BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Dials the configured hosts, retrying on failure.
///
/// `dial` is called once per attempt with the configuration. With
/// `max_retry_attempts = n` at most `n + 1` attempts are made. When every
/// attempt fails the returned [`DatabaseError::Connection`] carries the
/// address list, the attempt count, and the last error as its source.
///
/// # Errors
///
/// Returns [`DatabaseError::Configuration`] if the configuration is invalid,
/// or [`DatabaseError::Connection`] once retries are exhausted.
pub async fn establish<T, E, F, Fut>(config: &Config, mut dial: F) -> DatabaseResult<T>
where
    F: FnMut(&Config) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
{
    config.validate()?;

    let mut attempt: u32 = 0;

    loop {
        match dial(config).await {
            Ok(connection) => {
                info!(
                    addrs = ?config.addrs,
                    database = %config.database,
                    attempts = attempt + 1,
                    "connected to database"
                );
                return Ok(connection);
            }
            Err(err) => {
                let err: BoxError = err.into();

                warn!(
                    attempt = attempt + 1,
                    addrs = ?config.addrs,
                    error = %err,
                    "unable to connect to hosts"
                );

                if attempt >= config.max_retry_attempts {
                    return Err(DatabaseError::Connection {
                        addrs: config.addrs.clone(),
                        attempts: attempt + 1,
                        source: err,
                    });
                }

                attempt += 1;
                sleep(BACKOFF_UNIT * attempt).await;
            }
        }
    }
}
