//! Ledger use-cases backed by the order and balance repositories.
//!
//! This module implements the [`LoyaltyCommand`] and [`LoyaltyQuery`] driving
//! ports. It validates what the repositories cannot (positive amounts) and
//! translates port errors into the transport-agnostic domain [`Error`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    BalanceRepository, BalanceRepositoryError, LoyaltyCommand, LoyaltyQuery, OrderRepository,
    OrderRepositoryError,
};
use crate::domain::{
    Balance, Error, Order, OrderIntake, OrderNumber, UserId, Withdrawal, WithdrawalRequest,
};

/// Loyalty ledger service implementing the ledger driving ports.
#[derive(Clone)]
pub struct LoyaltyService<O, B> {
    orders: Arc<O>,
    balances: Arc<B>,
}

impl<O, B> LoyaltyService<O, B> {
    /// Create a new service with the given repositories.
    pub fn new(orders: Arc<O>, balances: Arc<B>) -> Self {
        Self { orders, balances }
    }
}

impl<O, B> LoyaltyService<O, B>
where
    O: OrderRepository,
    B: BalanceRepository,
{
    fn map_order_error(error: OrderRepositoryError) -> Error {
        match error {
            OrderRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("order repository unavailable: {message}"))
            }
            OrderRepositoryError::Query { message } => {
                Error::internal(format!("order repository error: {message}"))
            }
            OrderRepositoryError::Conflict { number } => {
                Error::conflict("order number was uploaded by another user").with_details(json!({
                    "order": number,
                    "code": "order_owned_by_another_user",
                }))
            }
            OrderRepositoryError::NotFound { number } => {
                Error::not_found(format!("order {number} not found"))
            }
        }
    }

    fn map_balance_error(error: BalanceRepositoryError) -> Error {
        match error {
            BalanceRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("balance repository unavailable: {message}"))
            }
            BalanceRepositoryError::Query { message } => {
                Error::internal(format!("balance repository error: {message}"))
            }
            BalanceRepositoryError::InsufficientFunds { current, requested } => {
                Error::insufficient_funds("balance does not cover the withdrawal").with_details(
                    json!({
                        "current": current.to_decimal(),
                        "requested": requested.to_decimal(),
                    }),
                )
            }
            BalanceRepositoryError::AlreadyExists { order } => {
                Error::conflict("a withdrawal for this order already exists").with_details(json!({
                    "order": order.as_str(),
                    "code": "duplicate_withdrawal",
                }))
            }
            BalanceRepositoryError::UserNotFound => Error::not_found("user not found"),
        }
    }
}

#[async_trait]
impl<O, B> LoyaltyCommand for LoyaltyService<O, B>
where
    O: OrderRepository,
    B: BalanceRepository,
{
    async fn submit_order(
        &self,
        user_id: &UserId,
        number: &OrderNumber,
    ) -> Result<OrderIntake, Error> {
        let intake = self
            .orders
            .create_order(number, user_id)
            .await
            .map_err(Self::map_order_error)?;
        debug!(user_id = %user_id, order = %number, ?intake, "order submitted");
        Ok(intake)
    }

    async fn withdraw(&self, request: WithdrawalRequest) -> Result<Withdrawal, Error> {
        if !request.amount.is_positive() {
            return Err(Error::invalid_request("withdrawal sum must be positive")
                .with_details(json!({ "field": "sum", "code": "non_positive_sum" })));
        }
        let withdrawal = self
            .balances
            .withdraw(&request)
            .await
            .map_err(Self::map_balance_error)?;
        info!(
            user_id = %withdrawal.user_id,
            order = %withdrawal.order,
            amount = %withdrawal.amount,
            "withdrawal committed"
        );
        Ok(withdrawal)
    }
}

#[async_trait]
impl<O, B> LoyaltyQuery for LoyaltyService<O, B>
where
    O: OrderRepository,
    B: BalanceRepository,
{
    async fn orders(&self, user_id: &UserId) -> Result<Vec<Order>, Error> {
        self.orders
            .list_for_user(user_id)
            .await
            .map_err(Self::map_order_error)
    }

    async fn balance(&self, user_id: &UserId) -> Result<Balance, Error> {
        self.balances
            .balance(user_id)
            .await
            .map_err(Self::map_balance_error)
    }

    async fn withdrawals(&self, user_id: &UserId) -> Result<Vec<Withdrawal>, Error> {
        self.balances
            .list_withdrawals(user_id)
            .await
            .map_err(Self::map_balance_error)
    }
}

#[cfg(test)]
#[path = "loyalty_service_tests.rs"]
mod tests;
