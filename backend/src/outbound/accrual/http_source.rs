//! Reqwest-backed accrual authority adapter.
//!
//! This adapter owns transport details only: URL construction, the request
//! timeout, status classification, `Retry-After` parsing and JSON decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};

use super::dto::AccrualResponseDto;
use crate::domain::OrderNumber;
use crate::domain::ports::{AccrualLookup, AccrualSource, AccrualSourceError};

const USER_AGENT: &str = "loyalty-backend-accrual-poller/0.1";

/// Accrual source issuing `GET {base}/api/orders/{number}`.
pub struct AccrualHttpSource {
    client: Client,
    base: Url,
}

impl AccrualHttpSource {
    /// Build an adapter whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, base })
    }

    fn order_url(&self, number: &OrderNumber) -> Result<Url, AccrualSourceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| AccrualSourceError::transport("accrual base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["api", "orders", number.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl AccrualSource for AccrualHttpSource {
    async fn lookup(&self, number: &OrderNumber) -> Result<AccrualLookup, AccrualSourceError> {
        let response = self
            .client
            .get(self.order_url(number)?)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let body = response.bytes().await.map_err(map_transport_error)?;
                parse_lookup(body.as_ref(), number)
            }
            StatusCode::NO_CONTENT => Err(AccrualSourceError::not_registered()),
            StatusCode::TOO_MANY_REQUESTS => Err(AccrualSourceError::RateLimited {
                retry_after: retry_after(response.headers()),
            }),
            _ if status.is_server_error() => Err(AccrualSourceError::server(status.as_u16())),
            _ => Err(AccrualSourceError::unexpected_status(status.as_u16())),
        }
    }
}

fn parse_lookup(body: &[u8], number: &OrderNumber) -> Result<AccrualLookup, AccrualSourceError> {
    let decoded: AccrualResponseDto = serde_json::from_slice(body).map_err(|error| {
        AccrualSourceError::decode(format!("invalid accrual JSON payload: {error}"))
    })?;
    decoded
        .into_lookup(number)
        .map_err(AccrualSourceError::decode)
}

/// Integer seconds only; HTTP-date values fall back to the configured delay.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn map_transport_error(error: reqwest::Error) -> AccrualSourceError {
    if error.is_timeout() {
        AccrualSourceError::timeout(error.to_string())
    } else {
        AccrualSourceError::transport(error.to_string())
    }
}
