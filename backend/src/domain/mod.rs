//! Domain primitives, services and the reconciliation poller.
//!
//! Purpose: keep the ledger rules transport agnostic. Inbound adapters call
//! the driving ports; outbound adapters implement the driven ports under
//! [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: adapter-facing failure payload.
//! - UserId, Login, Credentials, User: account identity.
//! - OrderNumber, Order, Points, Balance, Withdrawal: ledger entities.
//! - LoyaltyService, AccountService: driving-port implementations.
//! - AccrualPoller: background reconciliation against the accrual authority.

pub mod accrual_poller;
mod account_service;
pub mod error;
pub mod ledger;
mod loyalty_service;
pub mod ports;
pub mod user;

pub use self::accrual_poller::{
    AccrualPoller, AccrualPollerConfig, AccrualPollerPorts, AccrualPollerRuntime, PassFailure,
    PassFailureKind, PassReport, PassStatus, PollSleeper, TokioSleeper,
};
pub use self::account_service::AccountService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ledger::{
    AccrualUpdate, Balance, Order, OrderIntake, OrderNumber, OrderNumberValidationError,
    OrderStatus, Points, PointsError, TerminalStatus, UnknownOrderStatus, Withdrawal,
    WithdrawalRequest,
};
pub use self::loyalty_service::LoyaltyService;
pub use self::user::{
    Credentials, Login, PasswordHash, StoredUser, User, UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use loyalty_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::unauthorized("login required"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
