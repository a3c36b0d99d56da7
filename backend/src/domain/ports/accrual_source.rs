//! Driven port for the external accrual authority.
//!
//! The domain owns the lookup contract so the poller stays adapter-agnostic.
//! Every error here is transient from the poller's point of view: the order
//! stays unresolved and is asked about again on a later pass.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{AccrualUpdate, OrderNumber};

use super::define_port_error;

/// Non-terminal answers from the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingStatus {
    Registered,
    Processing,
}

/// Classified outcome of one successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccrualLookup {
    /// The authority reached a verdict.
    Terminal(AccrualUpdate),
    /// The authority is still deciding.
    Pending { status: PendingStatus },
}

define_port_error! {
    /// Errors surfaced while asking the authority about an order.
    pub enum AccrualSourceError {
        /// The authority has no record of the order yet.
        NotRegistered => "order is not registered with the accrual authority",
        /// The authority asked us to back off.
        RateLimited { retry_after: Option<Duration> } =>
            "accrual authority rate limited request (retry after {retry_after:?})",
        /// The authority failed internally.
        Server { status: u16 } => "accrual authority failed with status {status}",
        /// The authority answered with a status this client does not handle.
        UnexpectedStatus { status: u16 } =>
            "accrual authority returned unexpected status {status}",
        /// Network transport failed before receiving a response.
        Transport { message: String } => "accrual transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } => "accrual lookup timed out: {message}",
        /// The response body could not be decoded.
        Decode { message: String } => "accrual response decode failed: {message}",
    }
}

impl AccrualSourceError {
    /// Short label used as a structured log field.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotRegistered => "not_registered",
            Self::RateLimited { .. } => "rate_limited",
            Self::Server { .. } => "server",
            Self::UnexpectedStatus { .. } => "unexpected_status",
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Decode { .. } => "decode",
        }
    }
}

/// Port for one status lookup against the accrual authority.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccrualSource: Send + Sync {
    /// Ask the authority about `number` and classify the answer.
    async fn lookup(&self, number: &OrderNumber) -> Result<AccrualLookup, AccrualSourceError>;
}
