//! Driving port for ledger mutations requested by users.

use async_trait::async_trait;

use crate::domain::{Error, OrderIntake, OrderNumber, UserId, Withdrawal, WithdrawalRequest};

/// Use-cases that change the ledger on behalf of an authenticated user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoyaltyCommand: Send + Sync {
    /// Upload an order number for accrual.
    ///
    /// # Errors
    ///
    /// - `conflict` when another user already owns the number.
    /// - `service_unavailable` / `internal_error` on storage failure.
    async fn submit_order(
        &self,
        user_id: &UserId,
        number: &OrderNumber,
    ) -> Result<OrderIntake, Error>;

    /// Spend points against an order reference.
    ///
    /// # Errors
    ///
    /// - `invalid_request` for a non-positive amount.
    /// - `insufficient_funds` when the balance cannot cover the amount.
    /// - `conflict` when the same order reference was already withdrawn.
    async fn withdraw(&self, request: WithdrawalRequest) -> Result<Withdrawal, Error>;
}
