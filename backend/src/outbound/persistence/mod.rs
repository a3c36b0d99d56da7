//! PostgreSQL ledger adapters built on Diesel.
//!
//! Row structs and table definitions stay private to this module; the
//! repositories translate them into domain types and map every database
//! failure into the owning port's error enum.
//!
//! ```no_run
//! use loyalty_backend::outbound::persistence::{DbPool, DieselOrderRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/loyalty")).await?;
//! let orders = DieselOrderRepository::new(pool);
//! # let _ = orders;
//! # Ok(())
//! # }
//! ```

pub(crate) mod diesel_helpers;
mod diesel_balance_repository;
mod diesel_order_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_balance_repository::DieselBalanceRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
