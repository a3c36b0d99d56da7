//! HTTP inbound adapter exposing the loyalty REST endpoints.

use actix_web::web;

pub mod accounts;
pub mod balance;
pub mod error;
pub mod health;
pub mod orders;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
mod validation;

pub use error::ApiResult;

/// Register every `/api/user` endpoint.
///
/// ```
/// use actix_web::{App, web};
/// use loyalty_backend::inbound::http::configure_api;
///
/// let _app = App::new().service(web::scope("/api/user").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(accounts::register)
        .service(accounts::login)
        .service(orders::submit_order)
        .service(orders::list_orders)
        .service(balance::get_balance)
        .service(balance::withdraw)
        .service(balance::list_withdrawals);
}
