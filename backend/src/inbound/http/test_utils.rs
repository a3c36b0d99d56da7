//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, web};

use crate::domain::ports::{MockAccountCommand, MockLoyaltyCommand, MockLoyaltyQuery};
use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Account every authenticated test request acts as.
pub const TEST_USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

pub fn test_user_id() -> UserId {
    UserId::new(TEST_USER_ID).expect("fixture user id")
}

/// Session middleware with a fresh key, cookie name `session` and the
/// `Secure` flag disabled for plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The session cookie set by `response`, if any.
pub fn find_session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    find_session_cookie(response).expect("session cookie set")
}

/// Handler state backed by the given port mocks.
pub fn test_state(
    accounts: MockAccountCommand,
    loyalty: MockLoyaltyCommand,
    loyalty_query: MockLoyaltyQuery,
) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        Arc::new(accounts),
        Arc::new(loyalty),
        Arc::new(loyalty_query),
    ))
}

/// `GET /test/session` binds [`TEST_USER_ID`] to the session.
pub fn configure_test_login(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/test/session",
        web::get().to(|session: SessionContext| async move {
            session.persist_user(&test_user_id())?;
            Ok::<_, Error>(HttpResponse::Ok().finish())
        }),
    );
}
