//! Reconnection policy and connectivity injection.
//!
//! Every subscription recovers from transport failure the same way: while
//! online, wait a fixed delay and resubscribe from scratch; while offline,
//! suspend until connectivity returns. There is no backoff growth and no
//! attempt ceiling: a subscription retries for as long as its consumer is
//! attached.
//!
//! Connectivity is an injected trait so tests can script offline periods;
//! the production default is [`AlwaysOnline`].

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Connection lifecycle states, surfaced in structured logs.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    /// Subscribed and folding frames.
    Connected,
    /// The channel failed or ended.
    Disconnected {
        /// Human-readable reason.
        reason: String,
    },
    /// Waiting out a recovery pause before resubscribing.
    Reconnecting {
        /// Which wait the policy is parked on.
        wait: ReconnectWait,
    },
}

/// The two wait points of the reconnect state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectWait {
    /// Online: fixed timer.
    FixedDelay,
    /// Offline: the connectivity-restored event.
    Connectivity,
}

/// Online-state source consumed by the reconnect policy.
#[async_trait]
pub trait Connectivity: Send + Sync {
    /// Current online state.
    fn is_online(&self) -> bool;

    /// Resolves once connectivity is restored. Only awaited while offline.
    async fn wait_online(&self);
}

/// Production connectivity source: a server process has no portable
/// offline signal, so the policy always takes the fixed-delay branch.
pub struct AlwaysOnline;

#[async_trait]
impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }

    async fn wait_online(&self) {}
}

/// The uniform recovery strategy: fixed delay while online, suspend while
/// offline, retried without limit.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Fixed pause before resubscribing while online.
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(10),
        }
    }
}

impl ReconnectPolicy {
    /// Create a policy with the given fixed delay.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Wait out one recovery pause.
    ///
    /// Returns the wait branch taken, or `None` if `cancel` fired first;
    /// a detached consumer must never be resubscribed.
    pub async fn pause<C>(&self, connectivity: &C, cancel: &CancellationToken) -> Option<ReconnectWait>
    where
        C: Connectivity + ?Sized,
    {
        if connectivity.is_online() {
            tracing::info!(
                delay_ms = self.delay.as_millis() as u64,
                state = ?ConnectionState::Reconnecting { wait: ReconnectWait::FixedDelay },
                "waiting before resubscribe"
            );
            tokio::select! {
                _ = cancel.cancelled() => None,
                _ = tokio::time::sleep(self.delay) => Some(ReconnectWait::FixedDelay),
            }
        } else {
            tracing::info!(
                state = ?ConnectionState::Reconnecting { wait: ReconnectWait::Connectivity },
                "offline, waiting for connectivity"
            );
            tokio::select! {
                _ = cancel.cancelled() => None,
                _ = connectivity.wait_online() => Some(ReconnectWait::Connectivity),
            }
        }
    }
}
