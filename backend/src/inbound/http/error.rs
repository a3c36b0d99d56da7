//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting Actix handlers turn
//! domain failures into consistent JSON responses and status codes.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::InsufficientFunds => StatusCode::PAYMENT_REQUIRED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        error!(message = error.message(), "internal error returned to client");
        Error::internal("Internal server error")
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::invalid(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case::unauthorized(Error::unauthorized("no"), StatusCode::UNAUTHORIZED)]
    #[case::funds(Error::insufficient_funds("low"), StatusCode::PAYMENT_REQUIRED)]
    #[case::missing(Error::not_found("gone"), StatusCode::NOT_FOUND)]
    #[case::conflict(Error::conflict("taken"), StatusCode::CONFLICT)]
    #[case::unprocessable(Error::unprocessable("luhn"), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case::unavailable(Error::service_unavailable("db"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case::internal(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_matches_error_code(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(ResponseError::status_code(&error), expected);
    }

    async fn response_payload(error: Error) -> serde_json::Value {
        let response = ResponseError::error_response(&error);
        let bytes = to_bytes(response.into_body())
            .await
            .expect("reading response body succeeds");
        serde_json::from_slice(&bytes).expect("error JSON")
    }

    #[actix_web::test]
    async fn internal_errors_are_redacted() {
        let payload = response_payload(
            Error::internal("connection string leaked").with_details(json!({ "secret": "x" })),
        )
        .await;
        assert_eq!(
            payload,
            json!({ "code": "internal_error", "message": "Internal server error" })
        );
    }

    #[actix_web::test]
    async fn client_errors_keep_message_and_details() {
        let payload = response_payload(
            Error::conflict("order number was uploaded by another user")
                .with_details(json!({ "code": "order_owned_by_another_user" })),
        )
        .await;
        assert_eq!(
            payload,
            json!({
                "code": "conflict",
                "message": "order number was uploaded by another user",
                "details": { "code": "order_owned_by_another_user" }
            })
        );
    }
}
