//! Reference-counted ephemeral instances.
//!
//! An [`InstanceManager`] hands out [`InstanceLease`]s on one disposable
//! database instance. The first acquire provisions it, later acquires share
//! it, and the release that brings the holder count to zero tears it down.
//!
//! ```text
//! Uninitialized -> Provisioning -> Ready -> Draining -> Terminated
//! ```
//!
//! A terminated manager provisions a fresh instance on the next acquire.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mea::mutex::Mutex;
use tracing::{info, warn};

use crate::error::HarnessResult;

/// A provisioned instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Address clients should dial.
    pub host: String,
    /// Container backing the instance, if the harness started one.
    pub container: Option<String>,
}

/// Starts and stops instances for an [`InstanceManager`].
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn provision(&self) -> HarnessResult<Instance>;

    async fn teardown(&self, instance: Instance) -> HarnessResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    Provisioning,
    Ready,
    Draining,
    Terminated,
}

#[derive(Debug)]
struct Shared {
    holders: usize,
    instance: Option<Instance>,
    state: State,
}

/// Shares one instance between concurrent test callers.
///
/// Holder count, instance and state live behind one async mutex that is held
/// across provisioning and teardown, so an instance is never provisioned
/// twice nor torn down while held.
pub struct InstanceManager<P> {
    provisioner: P,
    shared: Mutex<Shared>,
}

impl<P: Provisioner> InstanceManager<P> {
    pub fn new(provisioner: P) -> Arc<Self> {
        Arc::new(Self {
            provisioner,
            shared: Mutex::new(Shared {
                holders: 0,
                instance: None,
                state: State::Uninitialized,
            }),
        })
    }

    /// Takes a hold on the instance, provisioning it if nobody holds it.
    ///
    /// # Errors
    ///
    /// Returns the provisioner's error; the manager then stays uninitialized
    /// and a later acquire tries again.
    pub async fn acquire(self: &Arc<Self>) -> HarnessResult<InstanceLease<P>> {
        let mut shared = self.shared.lock().await;

        let instance = match shared.instance.clone() {
            Some(instance) => instance,
            None => {
                shared.state = State::Provisioning;
                info!("provisioning test instance");

                match self.provisioner.provision().await {
                    Ok(instance) => {
                        info!(host = %instance.host, container = ?instance.container, "test instance ready");
                        shared.instance = Some(instance.clone());
                        shared.state = State::Ready;
                        instance
                    }
                    Err(err) => {
                        warn!(error = %err, "test instance provisioning failed");
                        shared.state = State::Uninitialized;
                        return Err(err);
                    }
                }
            }
        };
        shared.holders += 1;

        Ok(InstanceLease {
            manager: Arc::clone(self),
            instance,
            released: false,
        })
    }

    pub async fn state(&self) -> State {
        self.shared.lock().await.state
    }

    /// Number of leases currently held.
    pub async fn holders(&self) -> usize {
        self.shared.lock().await.holders
    }

    async fn release(&self) -> HarnessResult<()> {
        let mut shared = self.shared.lock().await;
        shared.holders = shared.holders.saturating_sub(1);

        if shared.holders > 0 {
            return Ok(());
        }

        let Some(instance) = shared.instance.take() else {
            return Ok(());
        };
        shared.state = State::Draining;
        info!(host = %instance.host, "tearing down test instance");

        let result = self.provisioner.teardown(instance).await;
        shared.state = State::Terminated;

        result
    }
}

impl<P> fmt::Debug for InstanceManager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceManager").finish_non_exhaustive()
    }
}

/// A hold on a shared instance.
///
/// Call [`release`](InstanceLease::release) when done; a lease dropped
/// without it keeps the instance alive.
pub struct InstanceLease<P: Provisioner> {
    manager: Arc<InstanceManager<P>>,
    instance: Instance,
    released: bool,
}

impl<P: Provisioner> InstanceLease<P> {
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn host(&self) -> &str {
        &self.instance.host
    }

    /// Gives the hold back, tearing the instance down if this was the last one.
    pub async fn release(mut self) -> HarnessResult<()> {
        self.released = true;
        self.manager.release().await
    }
}

impl<P: Provisioner> fmt::Debug for InstanceLease<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceLease")
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}

impl<P: Provisioner> Drop for InstanceLease<P> {
    fn drop(&mut self) {
        if !self.released {
            warn!(host = %self.instance.host, "instance lease dropped without release");
        }
    }
}
