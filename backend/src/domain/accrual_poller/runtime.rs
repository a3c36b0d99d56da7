//! Port and runtime dependency bundles for the accrual poller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{AccrualSource, OrderRepository};

use super::PollSleeper;

/// Port bundle required by the poller.
pub struct AccrualPollerPorts {
    /// Ledger work queue and write-back target.
    pub orders: Arc<dyn OrderRepository>,
    /// Outbound accrual authority adapter.
    pub source: Arc<dyn AccrualSource>,
}

impl AccrualPollerPorts {
    /// Build a strongly-typed poller port bundle.
    pub fn new(orders: Arc<dyn OrderRepository>, source: Arc<dyn AccrualSource>) -> Self {
        Self { orders, source }
    }
}

/// Runtime helpers used by the throttle.
pub struct AccrualPollerRuntime {
    /// Async sleep implementation.
    pub sleeper: Arc<dyn PollSleeper>,
}

impl Default for AccrualPollerRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
        }
    }
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl PollSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
