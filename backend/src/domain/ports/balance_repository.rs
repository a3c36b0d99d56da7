//! Driven port for balance reads and transactional withdrawals.

use async_trait::async_trait;

use crate::domain::{Balance, OrderNumber, Points, UserId, Withdrawal, WithdrawalRequest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by balance repository adapters.
    pub enum BalanceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "balance repository connection failed: {message}",
        /// Query, mutation or transaction failed; nothing was committed.
        Query { message: String } => "balance repository query failed: {message}",
        /// The balance cannot cover the requested amount.
        InsufficientFunds { current: Points, requested: Points } =>
            "insufficient funds: balance {current}, requested {requested}",
        /// The user already withdrew against this order reference.
        AlreadyExists { order: OrderNumber } => "withdrawal for order {order} already exists",
        /// The account does not exist.
        UserNotFound => "user not found",
    }
}

/// Port for the balance authority.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceRepository: Send + Sync {
    /// Current and withdrawn totals computed from one snapshot.
    async fn balance(&self, user_id: &UserId) -> Result<Balance, BalanceRepositoryError>;

    /// Atomically check the balance and record the withdrawal.
    ///
    /// Concurrent withdrawals for the same user are serialised so the balance
    /// never goes negative; different users do not contend.
    async fn withdraw(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<Withdrawal, BalanceRepositoryError>;

    /// The user's withdrawals, most recent first.
    async fn list_withdrawals(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Withdrawal>, BalanceRepositoryError>;
}
