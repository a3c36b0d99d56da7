//! Driven port for account persistence.
use async_trait::async_trait;

use crate::domain::{Login, PasswordHash, StoredUser, User};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this login.
        LoginTaken { login: String } => "login already registered: {login}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account and return it with its generated identifier.
    async fn create(
        &self,
        login: &Login,
        password_hash: &PasswordHash,
    ) -> Result<User, UserPersistenceError>;

    /// Fetch an account and its stored credential by login.
    async fn find_by_login(&self, login: &Login)
    -> Result<Option<StoredUser>, UserPersistenceError>;
}
