//! Driven port for password hashing.

use async_trait::async_trait;

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hashers.
    pub enum CredentialHasherError {
        /// Hashing or verification failed for a reason other than a mismatch.
        Hashing { message: String } => "credential hashing failed: {message}",
        /// The stored hash is not a valid encoded hash.
        MalformedHash { message: String } => "stored credential hash is malformed: {message}",
    }
}

/// Port for producing and checking password hashes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password with a fresh salt.
    async fn hash(&self, password: &str) -> Result<PasswordHash, CredentialHasherError>;

    /// Check `password` against a stored hash. A mismatch is `Ok(false)`.
    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHasherError>;
}
