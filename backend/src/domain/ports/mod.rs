//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod accrual_source;
mod balance_repository;
mod credential_hasher;
mod loyalty_command;
mod loyalty_query;
mod order_repository;
mod user_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::AccountCommand;
#[cfg(test)]
pub use accrual_source::MockAccrualSource;
pub use accrual_source::{AccrualLookup, AccrualSource, AccrualSourceError, PendingStatus};
#[cfg(test)]
pub use balance_repository::MockBalanceRepository;
pub use balance_repository::{BalanceRepository, BalanceRepositoryError};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError};
#[cfg(test)]
pub use loyalty_command::MockLoyaltyCommand;
pub use loyalty_command::LoyaltyCommand;
#[cfg(test)]
pub use loyalty_query::MockLoyaltyQuery;
pub use loyalty_query::LoyaltyQuery;
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderRepository, OrderRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
