//! Account HTTP handlers.
//!
//! ```text
//! POST /api/user/register {"login":"ada","password":"s3cret"}
//! POST /api/user/login    {"login":"ada","password":"s3cret"}
//! ```
//!
//! Both endpoints bind the account to the session cookie on success.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_credentials;

/// Request body shared by registration and login.
#[derive(Debug, Deserialize, Serialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = parse_credentials(&payload.login, &payload.password)?;
    let user_id = state.accounts.register(&credentials).await?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = parse_credentials(&payload.login, &payload.password)?;
    let user_id = state.accounts.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}
