//! Driving port for registration and login.
//!
//! Inbound adapters call this port to create or authenticate accounts
//! without importing persistence or hashing infrastructure.

use async_trait::async_trait;

use crate::domain::{Credentials, Error, UserId};

/// Account use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns `conflict` when the login is already registered.
    async fn register(&self, credentials: &Credentials) -> Result<UserId, Error>;

    /// Validate credentials and return the authenticated user id.
    ///
    /// # Errors
    ///
    /// Returns `unauthorized` for an unknown login or a wrong password.
    async fn authenticate(&self, credentials: &Credentials) -> Result<UserId, Error>;
}
