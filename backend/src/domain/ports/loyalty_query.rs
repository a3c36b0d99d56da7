//! Driving port for ledger reads.

use async_trait::async_trait;

use crate::domain::{Balance, Error, Order, UserId, Withdrawal};

/// Read-only views over one user's ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoyaltyQuery: Send + Sync {
    /// Uploaded orders, newest first.
    async fn orders(&self, user_id: &UserId) -> Result<Vec<Order>, Error>;

    /// Current and withdrawn totals.
    async fn balance(&self, user_id: &UserId) -> Result<Balance, Error>;

    /// Withdrawals, newest first.
    async fn withdrawals(&self, user_id: &UserId) -> Result<Vec<Withdrawal>, Error>;
}
