//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL ledger repositories over Diesel
//! - **accrual**: reqwest client for the accrual authority
//! - **credentials**: argon2 password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod accrual;
pub mod credentials;
pub mod persistence;
