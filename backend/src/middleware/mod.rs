//! Actix middleware shared by every route.

pub mod request_trace;

pub use request_trace::{RequestId, RequestTrace};
