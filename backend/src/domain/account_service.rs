//! Registration and login on top of the user repository and a hasher.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    AccountCommand, CredentialHasher, CredentialHasherError, UserPersistenceError, UserRepository,
};
use crate::domain::{Credentials, Error, UserId};

const INVALID_CREDENTIALS: &str = "invalid login or password";

/// Account service implementing [`AccountCommand`].
#[derive(Clone)]
pub struct AccountService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> AccountService<U, H> {
    /// Create a new service with the given repository and hasher.
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::LoginTaken { login } => Error::conflict("login is already taken")
            .with_details(json!({ "login": login, "code": "login_taken" })),
    }
}

fn map_hasher_error(error: CredentialHasherError) -> Error {
    Error::internal(error.to_string())
}

#[async_trait]
impl<U, H> AccountCommand for AccountService<U, H>
where
    U: UserRepository,
    H: CredentialHasher,
{
    async fn register(&self, credentials: &Credentials) -> Result<UserId, Error> {
        let hash = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(map_hasher_error)?;
        let user = self
            .users
            .create(credentials.login(), &hash)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, login = %user.login, "user registered");
        Ok(user.id)
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<UserId, Error> {
        let Some(stored) = self
            .users
            .find_by_login(credentials.login())
            .await
            .map_err(map_user_error)?
        else {
            debug!(login = %credentials.login(), "login rejected: unknown account");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .await
            .map_err(map_hasher_error)?;
        if !matches {
            debug!(login = %credentials.login(), "login rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(stored.user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockCredentialHasher, MockUserRepository};
    use crate::domain::{ErrorCode, Login, PasswordHash, StoredUser, User};
    use rstest::{fixture, rstest};

    #[fixture]
    fn credentials() -> Credentials {
        Credentials::try_from_parts("ada", "correct horse").expect("valid credentials")
    }

    fn stored(id: UserId) -> StoredUser {
        StoredUser {
            user: User {
                id,
                login: Login::new("ada").expect("valid login"),
            },
            password_hash: PasswordHash::new("$argon2id$stub"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn register_hashes_before_persisting(credentials: Credentials) {
        let id = UserId::random();
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .withf(|password: &str| password == "correct horse")
            .times(1)
            .return_once(|_| Ok(PasswordHash::new("$argon2id$stub")));
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .withf(|_, hash| hash.as_str() == "$argon2id$stub")
            .times(1)
            .return_once(move |login, _| {
                Ok(User {
                    id,
                    login: login.clone(),
                })
            });

        let service = AccountService::new(Arc::new(users), Arc::new(hasher));
        assert_eq!(service.register(&credentials).await.expect("registered"), id);
    }

    #[rstest]
    #[tokio::test]
    async fn register_maps_taken_login_to_conflict(credentials: Credentials) {
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .return_once(|_| Ok(PasswordHash::new("$argon2id$stub")));
        let mut users = MockUserRepository::new();
        users
            .expect_create()
            .return_once(|_, _| Err(UserPersistenceError::login_taken("ada")));

        let service = AccountService::new(Arc::new(users), Arc::new(hasher));
        let error = service.register(&credentials).await.expect_err("conflict");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case::matching(true, None)]
    #[case::mismatch(false, Some(ErrorCode::Unauthorized))]
    #[tokio::test]
    async fn authenticate_checks_password(
        credentials: Credentials,
        #[case] matches: bool,
        #[case] expected_error: Option<ErrorCode>,
    ) {
        let id = UserId::random();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_login()
            .times(1)
            .return_once(move |_| Ok(Some(stored(id))));
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_verify()
            .times(1)
            .return_once(move |_, _| Ok(matches));

        let service = AccountService::new(Arc::new(users), Arc::new(hasher));
        let result = service.authenticate(&credentials).await;
        match expected_error {
            None => assert_eq!(result.expect("authenticated"), id),
            Some(code) => assert_eq!(result.expect_err("rejected").code(), code),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_rejects_unknown_login(credentials: Credentials) {
        let mut users = MockUserRepository::new();
        users.expect_find_by_login().return_once(|_| Ok(None));
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_verify().times(0);

        let service = AccountService::new(Arc::new(users), Arc::new(hasher));
        let error = service
            .authenticate(&credentials)
            .await
            .expect_err("unknown login");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn authenticate_maps_connection_failure(credentials: Credentials) {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_login()
            .return_once(|_| Err(UserPersistenceError::connection("refused")));

        let service = AccountService::new(Arc::new(users), Arc::new(MockCredentialHasher::new()));
        let error = service
            .authenticate(&credentials)
            .await
            .expect_err("unavailable");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
