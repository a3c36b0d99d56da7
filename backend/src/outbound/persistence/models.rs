//! Internal Diesel row structs for the ledger tables.
//!
//! These types are implementation details of the persistence layer and never
//! reach the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use uuid::Uuid;

use super::schema::{orders, users, withdrawals};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub login: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub login: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub number: String,
    pub user_id: Uuid,
    pub status: String,
    pub accrual: i64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub number: &'a str,
    pub user_id: Uuid,
    pub status: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = withdrawals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WithdrawalRow {
    pub user_id: Uuid,
    pub order_number: String,
    pub amount: i64,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = withdrawals)]
pub(crate) struct NewWithdrawalRow<'a> {
    pub user_id: Uuid,
    pub order_number: &'a str,
    pub amount: i64,
}

/// Both balance sums read by one statement.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub(crate) struct BalanceTotalsRow {
    #[diesel(sql_type = BigInt)]
    pub accrued: i64,
    #[diesel(sql_type = BigInt)]
    pub withdrawn: i64,
}
