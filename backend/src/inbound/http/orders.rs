//! Order HTTP handlers.
//!
//! ```text
//! POST /api/user/orders  (text/plain body: the order number)
//! GET  /api/user/orders
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Serialize;

use crate::domain::{Order, OrderIntake};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_order_number;

/// One order as listed to its owner.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub number: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrual: Option<f64>,
    /// RFC 3339 upload time.
    pub uploaded_at: String,
}

impl From<Order> for OrderResponse {
    fn from(value: Order) -> Self {
        Self {
            number: value.number.as_str().to_owned(),
            status: value.status.as_str(),
            accrual: value.accrual.map(|points| points.to_decimal()),
            uploaded_at: value.uploaded_at.to_rfc3339(),
        }
    }
}

/// Upload an order number for accrual.
///
/// `202` when newly accepted, `200` when this user already uploaded it.
#[post("/orders")]
pub async fn submit_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: String,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let number = parse_order_number(&body, "order")?;
    let response = match state.loyalty.submit_order(&user_id, &number).await? {
        OrderIntake::Accepted => HttpResponse::Accepted().finish(),
        OrderIntake::AlreadyOwned => HttpResponse::Ok().finish(),
    };
    Ok(response)
}

#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let orders = state.loyalty_query.orders(&user_id).await?;
    if orders.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "private, no-cache, must-revalidate"))
        .json(body))
}

#[cfg(test)]
#[path = "orders_tests.rs"]
mod tests;
