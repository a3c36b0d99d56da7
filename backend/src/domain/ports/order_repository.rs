//! Driven port for order intake, listing and accrual write-back.
//!
//! Order numbers are unique across every account: the first uploader owns a
//! number forever. The poller consumes [`OrderRepository::list_unresolved`]
//! as its work queue and folds terminal verdicts back through
//! [`OrderRepository::apply_accrual`].

use async_trait::async_trait;

use crate::domain::{AccrualUpdate, Order, OrderIntake, OrderNumber, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
        /// The number is already owned by a different account.
        Conflict { number: String } => "order {number} belongs to another user",
        /// The order to update does not exist.
        NotFound { number: String } => "order {number} not found",
    }
}

/// Port for the order side of the ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Record `number` for `user_id` in status `NEW`.
    ///
    /// Returns [`OrderIntake::AlreadyOwned`] when the same user uploaded the
    /// number before, and [`OrderRepositoryError::Conflict`] when another
    /// user owns it. Neither case mutates anything.
    async fn create_order(
        &self,
        number: &OrderNumber,
        user_id: &UserId,
    ) -> Result<OrderIntake, OrderRepositoryError>;

    /// The user's orders, most recently uploaded first. Empty is not an error.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Every order in `NEW` or `PROCESSING`, across all users.
    async fn list_unresolved(&self) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Move an unresolved order to its terminal status.
    ///
    /// Idempotent: an order already in a terminal status is left untouched and
    /// the call succeeds. A missing order yields
    /// [`OrderRepositoryError::NotFound`].
    async fn apply_accrual(&self, update: &AccrualUpdate) -> Result<(), OrderRepositoryError>;
}
