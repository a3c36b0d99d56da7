//! Request validation shared by the inbound HTTP handlers.

use serde_json::json;

use crate::domain::{
    Credentials, Error, OrderNumber, OrderNumberValidationError, Points, UserValidationError,
};

/// Parse a client-supplied order number.
///
/// A missing number is a malformed request (400); a present but unusable one
/// is unprocessable (422).
pub(crate) fn parse_order_number(raw: &str, field: &str) -> Result<OrderNumber, Error> {
    OrderNumber::new(raw).map_err(|err| {
        let code = match err {
            OrderNumberValidationError::Empty => {
                return Error::invalid_request("order number must not be empty")
                    .with_details(json!({ "field": field, "code": "empty_order_number" }));
            }
            OrderNumberValidationError::NonDigit => "non_digit_order_number",
            OrderNumberValidationError::TooLong { .. } => "order_number_too_long",
            OrderNumberValidationError::Checksum => "invalid_checksum",
        };
        Error::unprocessable(format!("invalid order number: {err}"))
            .with_details(json!({ "field": field, "code": code }))
    })
}

/// Parse a positive withdrawal amount given in points.
pub(crate) fn parse_positive_amount(raw: f64, field: &str) -> Result<Points, Error> {
    match Points::try_from_decimal(raw) {
        Ok(amount) if amount.is_positive() => Ok(amount),
        Ok(_) => Err(Error::unprocessable("amount must be positive")
            .with_details(json!({ "field": field, "code": "non_positive_sum" }))),
        Err(err) => Err(Error::unprocessable(format!("invalid amount: {err}"))
            .with_details(json!({ "field": field, "code": "invalid_sum" }))),
    }
}

/// Validate login and password from a request body.
pub(crate) fn parse_credentials(login: &str, password: &str) -> Result<Credentials, Error> {
    Credentials::try_from_parts(login, password).map_err(|err| match err {
        UserValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
        _ => Error::invalid_request("login must not be empty")
            .with_details(json!({ "field": "login", "code": "empty_login" })),
    })
}
