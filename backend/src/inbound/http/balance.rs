//! Balance and withdrawal HTTP handlers.
//!
//! ```text
//! GET  /api/user/balance
//! POST /api/user/balance/withdraw {"order":"2377225624","sum":751}
//! GET  /api/user/balance/withdrawals
//! ```
//!
//! Amounts cross the wire as decimal points and are held internally as exact
//! hundredths.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Balance, Withdrawal, WithdrawalRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_order_number, parse_positive_amount};

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub current: f64,
    pub withdrawn: f64,
}

impl From<Balance> for BalanceResponse {
    fn from(value: Balance) -> Self {
        Self {
            current: value.current.to_decimal(),
            withdrawn: value.withdrawn.to_decimal(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WithdrawRequest {
    #[serde(default)]
    pub order: String,
    pub sum: f64,
}

#[derive(Debug, Serialize)]
pub struct WithdrawalResponse {
    pub order: String,
    pub sum: f64,
    pub processed_at: String,
}

impl From<Withdrawal> for WithdrawalResponse {
    fn from(value: Withdrawal) -> Self {
        Self {
            order: value.order.as_str().to_owned(),
            sum: value.amount.to_decimal(),
            processed_at: value.processed_at.to_rfc3339(),
        }
    }
}

#[get("/balance")]
pub async fn get_balance(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let balance = state.loyalty_query.balance(&user_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "private, no-cache, must-revalidate"))
        .json(BalanceResponse::from(balance)))
}

/// Spend points against an order reference.
///
/// `402` when the balance cannot cover `sum`, `409` when this order
/// reference was already used for a withdrawal.
#[post("/balance/withdraw")]
pub async fn withdraw(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<WithdrawRequest>,
) -> ApiResult<web::Json<WithdrawalResponse>> {
    let user_id = session.require_user_id()?;
    let WithdrawRequest { order, sum } = payload.into_inner();
    let request = WithdrawalRequest {
        user_id,
        order: parse_order_number(&order, "order")?,
        amount: parse_positive_amount(sum, "sum")?,
    };
    let withdrawal = state.loyalty.withdraw(request).await?;
    Ok(web::Json(WithdrawalResponse::from(withdrawal)))
}

#[get("/balance/withdrawals")]
pub async fn list_withdrawals(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let withdrawals = state.loyalty_query.withdrawals(&user_id).await?;
    if withdrawals.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let body: Vec<WithdrawalResponse> = withdrawals
        .into_iter()
        .map(WithdrawalResponse::from)
        .collect();
    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "private, no-cache, must-revalidate"))
        .json(body))
}
