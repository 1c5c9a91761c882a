//! Harness error types.

use docport_core::error::DatabaseError;
use thiserror::Error;

/// Failure while provisioning, using, or tearing down a test instance.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to execute `docker {command}`: {source}")]
    Command {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to check for image {image}: {output}")]
    ImageCheck { image: String, output: String },
    #[error("failed to pull image {image}: {output}")]
    Pull { image: String, output: String },
    #[error("failed to start container from {image}: {output}")]
    Start { image: String, output: String },
    #[error("no output from docker inspect")]
    EmptyInspect,
    #[error("unable to parse docker inspect output: {0}")]
    Inspect(#[from] serde_json::Error),
    #[error("no IP for container {container}. Not running?")]
    NoAddress { container: String },
    #[error("instance at {host} never became ready: {source}")]
    NotReady {
        host: String,
        #[source]
        source: DatabaseError,
    },
    #[error("failed to kill container {container}: {output}")]
    Teardown { container: String, output: String },
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
