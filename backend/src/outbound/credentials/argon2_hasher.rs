//! Argon2id implementation of the `CredentialHasher` port.
//!
//! Hashing is deliberately slow, so both operations run on the blocking
//! pool rather than on an async worker thread.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as PhcError, PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier as _,
    SaltString,
};
use async_trait::async_trait;

use crate::domain::PasswordHash;
use crate::domain::ports::{CredentialHasher, CredentialHasherError};

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2CredentialHasher;

fn hash_blocking(password: &str) -> Result<PasswordHash, CredentialHasherError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| PasswordHash::new(hash.to_string()))
        .map_err(|err| CredentialHasherError::hashing(err.to_string()))
}

fn verify_blocking(password: &str, encoded: &str) -> Result<bool, CredentialHasherError> {
    let parsed = PhcHash::new(encoded)
        .map_err(|err| CredentialHasherError::malformed_hash(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PhcError::Password) => Ok(false),
        Err(err) => Err(CredentialHasherError::hashing(err.to_string())),
    }
}

fn join_error(error: tokio::task::JoinError) -> CredentialHasherError {
    CredentialHasherError::hashing(format!("hashing task failed: {error}"))
}

#[async_trait]
impl CredentialHasher for Argon2CredentialHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, CredentialHasherError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(join_error)?
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHasherError> {
        let password = password.to_owned();
        let encoded = hash.as_str().to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &encoded))
            .await
            .map_err(join_error)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn hashes_verify_only_the_original_password() {
        let hasher = Argon2CredentialHasher;
        let hash = hasher.hash("correct horse").await.expect("hash");

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).await.expect("verify"));
        assert!(!hasher.verify("battery staple", &hash).await.expect("verify"));
    }

    #[tokio::test]
    async fn salts_differ_between_hashes() {
        let hasher = Argon2CredentialHasher;
        let first = hasher.hash("same").await.expect("hash");
        let second = hasher.hash("same").await.expect("hash");
        assert_ne!(first.as_str(), second.as_str());
    }

    #[rstest]
    fn malformed_hashes_are_reported() {
        let result = verify_blocking("pw", "not-a-phc-string");
        assert!(matches!(
            result,
            Err(CredentialHasherError::MalformedHash { .. })
        ));
    }
}
