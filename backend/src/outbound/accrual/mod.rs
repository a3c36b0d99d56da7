//! Accrual authority outbound adapters.
//!
//! A thin reqwest implementation of the `AccrualSource` port.

mod dto;
mod http_source;

pub use http_source::AccrualHttpSource;
