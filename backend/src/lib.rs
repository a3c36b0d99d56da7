//! Loyalty points backend.
//!
//! Users register, submit purchase order numbers and spend accrued points.
//! A background poller asks the external accrual authority about pending
//! orders and writes terminal verdicts back into the ledger.
//!
//! - [`domain`]: ledger types, services and the reconciliation poller.
//! - [`inbound`]: actix-web handlers under `/api/user`.
//! - [`outbound`]: Diesel persistence, the accrual HTTP client and argon2.
//! - [`settings`]: OrthoConfig process configuration.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(test)]
mod test_support;
