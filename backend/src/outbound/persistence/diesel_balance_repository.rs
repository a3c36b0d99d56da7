//! PostgreSQL-backed `BalanceRepository` adapter.
//!
//! The balance is never stored. It is derived from `orders` and
//! `withdrawals` by a single statement so both sums come from one snapshot.
//! Withdrawals lock the owning `users` row first, which serialises spends per
//! account while leaving other accounts uncontended.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Uuid as SqlUuid;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{BalanceRepository, BalanceRepositoryError};
use crate::domain::{Balance, OrderNumber, Points, UserId, Withdrawal, WithdrawalRequest};

use super::diesel_helpers::{is_unique_violation, map_basic_diesel_error, pool_error_message};
use super::models::{BalanceTotalsRow, NewWithdrawalRow, WithdrawalRow};
use super::pool::{DbPool, PoolError};
use super::schema::{users, withdrawals};

const BALANCE_TOTALS_SQL: &str = "\
SELECT \
    COALESCE((SELECT SUM(accrual) FROM orders \
              WHERE user_id = $1 AND status = 'PROCESSED'), 0)::BIGINT AS accrued, \
    COALESCE((SELECT SUM(amount) FROM withdrawals WHERE user_id = $1), 0)::BIGINT AS withdrawn";

/// Diesel implementation of the balance authority.
#[derive(Clone)]
pub struct DieselBalanceRepository {
    pool: DbPool,
}

impl DieselBalanceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BalanceRepositoryError {
    BalanceRepositoryError::connection(pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> BalanceRepositoryError {
    map_basic_diesel_error(
        error,
        BalanceRepositoryError::query,
        BalanceRepositoryError::connection,
    )
}

/// Failure inside the withdrawal transaction. Any variant rolls it back.
enum WithdrawTxError {
    Diesel(diesel::result::Error),
    Rejected(BalanceRepositoryError),
}

impl From<diesel::result::Error> for WithdrawTxError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

fn totals_to_balance(totals: BalanceTotalsRow) -> Balance {
    Balance {
        current: Points::from_hundredths(totals.accrued.saturating_sub(totals.withdrawn)),
        withdrawn: Points::from_hundredths(totals.withdrawn),
    }
}

async fn read_balance(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
) -> Result<Balance, diesel::result::Error> {
    let totals = diesel::sql_query(BALANCE_TOTALS_SQL)
        .bind::<SqlUuid, _>(user_id)
        .get_result::<BalanceTotalsRow>(conn)
        .await?;
    Ok(totals_to_balance(totals))
}

fn row_to_withdrawal(row: WithdrawalRow) -> Result<Withdrawal, BalanceRepositoryError> {
    let order = OrderNumber::new(&row.order_number).map_err(|err| {
        BalanceRepositoryError::query(format!(
            "stored withdrawal order {} is invalid: {err}",
            row.order_number
        ))
    })?;
    Ok(Withdrawal {
        order,
        user_id: UserId::from_uuid(row.user_id),
        amount: Points::from_hundredths(row.amount),
        processed_at: row.processed_at,
    })
}

#[async_trait]
impl BalanceRepository for DieselBalanceRepository {
    async fn balance(&self, user_id: &UserId) -> Result<Balance, BalanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        read_balance(&mut conn, *user_id.as_uuid())
            .await
            .map_err(map_diesel_error)
    }

    async fn withdraw(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<Withdrawal, BalanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = *request.user_id.as_uuid();

        let result = conn
            .transaction::<_, WithdrawTxError, _>(|conn| {
                async move {
                    let locked = users::table
                        .filter(users::id.eq(user_id))
                        .select(users::id)
                        .for_update()
                        .first::<Uuid>(conn)
                        .await
                        .optional()?;
                    if locked.is_none() {
                        return Err(WithdrawTxError::Rejected(
                            BalanceRepositoryError::user_not_found(),
                        ));
                    }

                    let balance = read_balance(conn, user_id).await?;
                    if request.amount > balance.current {
                        return Err(WithdrawTxError::Rejected(
                            BalanceRepositoryError::insufficient_funds(
                                balance.current,
                                request.amount,
                            ),
                        ));
                    }

                    let row = NewWithdrawalRow {
                        user_id,
                        order_number: request.order.as_str(),
                        amount: request.amount.hundredths(),
                    };
                    let stored = diesel::insert_into(withdrawals::table)
                        .values(&row)
                        .returning(WithdrawalRow::as_returning())
                        .get_result::<WithdrawalRow>(conn)
                        .await?;
                    Ok(stored)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(row) => row_to_withdrawal(row),
            Err(WithdrawTxError::Rejected(error)) => {
                debug!(user_id = %request.user_id, error = %error, "withdrawal rejected");
                Err(error)
            }
            Err(WithdrawTxError::Diesel(error)) if is_unique_violation(&error) => Err(
                BalanceRepositoryError::already_exists(request.order.clone()),
            ),
            Err(WithdrawTxError::Diesel(error)) => Err(map_diesel_error(error)),
        }
    }

    async fn list_withdrawals(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Withdrawal>, BalanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = withdrawals::table
            .filter(withdrawals::user_id.eq(*user_id.as_uuid()))
            .order((
                withdrawals::processed_at.desc(),
                withdrawals::order_number.asc(),
            ))
            .select(WithdrawalRow::as_select())
            .load::<WithdrawalRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_withdrawal).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::untouched(50_000, 0, 50_000)]
    #[case::partly_spent(72_950, 12_345, 60_605)]
    #[case::fully_spent(500, 500, 0)]
    fn current_is_accrued_minus_withdrawn(
        #[case] accrued: i64,
        #[case] withdrawn: i64,
        #[case] current: i64,
    ) {
        let balance = totals_to_balance(BalanceTotalsRow { accrued, withdrawn });
        assert_eq!(balance.current, Points::from_hundredths(current));
        assert_eq!(balance.withdrawn, Points::from_hundredths(withdrawn));
    }

    #[rstest]
    fn totals_statement_binds_one_user_parameter() {
        assert_eq!(BALANCE_TOTALS_SQL.matches("$1").count(), 2);
        assert!(!BALANCE_TOTALS_SQL.contains("$2"));
    }
}
