//! PostgreSQL-backed `OrderRepository` adapter.
//!
//! Ownership is enforced by the primary key on `orders.number`: intake inserts
//! with `ON CONFLICT DO NOTHING` and inspects the existing row only when the
//! insert was a no-op. Accrual write-back filters on the unresolved statuses,
//! so a verdict lands at most once.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{
    AccrualUpdate, Order, OrderIntake, OrderNumber, OrderStatus, Points, UserId,
};

use super::diesel_helpers::{map_basic_diesel_error, pool_error_message};
use super::models::{NewOrderRow, OrderRow};
use super::pool::{DbPool, PoolError};
use super::schema::orders;

const UNRESOLVED_STATUSES: [&str; 2] = [OrderStatus::New.as_str(), OrderStatus::Processing.as_str()];

/// Diesel implementation of the order ledger.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    OrderRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    map_basic_diesel_error(
        error,
        OrderRepositoryError::query,
        OrderRepositoryError::connection,
    )
}

fn row_to_order(row: OrderRow) -> Result<Order, OrderRepositoryError> {
    let number = OrderNumber::new(&row.number).map_err(|err| {
        OrderRepositoryError::query(format!("stored order number {} is invalid: {err}", row.number))
    })?;
    let status = row
        .status
        .parse::<OrderStatus>()
        .map_err(|err| OrderRepositoryError::query(err.to_string()))?;
    let accrual = (status == OrderStatus::Processed).then(|| Points::from_hundredths(row.accrual));
    Ok(Order {
        number,
        user_id: UserId::from_uuid(row.user_id),
        status,
        accrual,
        uploaded_at: row.uploaded_at,
    })
}

fn rows_to_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, OrderRepositoryError> {
    rows.into_iter().map(row_to_order).collect()
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn create_order(
        &self,
        number: &OrderNumber,
        user_id: &UserId,
    ) -> Result<OrderIntake, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewOrderRow {
            number: number.as_str(),
            user_id: *user_id.as_uuid(),
            status: OrderStatus::New.as_str(),
        };

        let inserted = diesel::insert_into(orders::table)
            .values(&row)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if inserted == 1 {
            return Ok(OrderIntake::Accepted);
        }

        let owner = orders::table
            .filter(orders::number.eq(number.as_str()))
            .select(orders::user_id)
            .first::<uuid::Uuid>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match owner {
            Some(owner) if owner == *user_id.as_uuid() => Ok(OrderIntake::AlreadyOwned),
            Some(_) => Err(OrderRepositoryError::conflict(number.as_str())),
            None => Err(OrderRepositoryError::query(format!(
                "order {number} vanished after a conflicting insert"
            ))),
        }
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = orders::table
            .filter(orders::user_id.eq(*user_id.as_uuid()))
            .order((orders::uploaded_at.desc(), orders::number.asc()))
            .select(OrderRow::as_select())
            .load::<OrderRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_orders(rows)
    }

    async fn list_unresolved(&self) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = orders::table
            .filter(orders::status.eq_any(UNRESOLVED_STATUSES))
            .order(orders::uploaded_at.asc())
            .select(OrderRow::as_select())
            .load::<OrderRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_orders(rows)
    }

    async fn apply_accrual(&self, update: &AccrualUpdate) -> Result<(), OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let status = OrderStatus::from(update.status);

        let updated = diesel::update(
            orders::table
                .filter(orders::number.eq(update.number.as_str()))
                .filter(orders::status.eq_any(UNRESOLVED_STATUSES)),
        )
        .set((
            orders::status.eq(status.as_str()),
            orders::accrual.eq(update.accrual.hundredths()),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated == 1 {
            return Ok(());
        }

        // Already terminal is a no-op; only a missing row is an error.
        let exists = diesel::select(diesel::dsl::exists(
            orders::table.filter(orders::number.eq(update.number.as_str())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if exists {
            Ok(())
        } else {
            Err(OrderRepositoryError::not_found(update.number.as_str()))
        }
    }
}
