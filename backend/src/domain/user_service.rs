//! Account queries, registration, self-service edits, and login bookkeeping.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::ports::{LoginService, PasswordHasher, UserAccounts, UserRepository};
use super::repository_error_mapping::{map_hash_error, map_user_error};
use super::{
    Error, LoginCredentials, NewPassword, Page, PageRequest, PasswordDigest, Registration, Role,
    User, UserId, UserProfile,
};

/// Account service implementing [`UserAccounts`].
#[derive(Clone)]
pub struct UserAccountService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> UserAccountService<U, H> {
    /// Create a new service over `users`, hashing passwords with `hasher`.
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

fn user_not_found(id: UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

#[async_trait]
impl<U, H> UserAccounts for UserAccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let Registration {
            email,
            password,
            profile,
        } = registration;
        let digest = self.hasher.hash(&password).await.map_err(map_hash_error)?;
        let user = User {
            id: UserId::random(),
            email,
            roles: vec![Role::User],
            profile: Some(profile),
        };
        self.users
            .register(&user, &digest)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(id))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, Error> {
        self.users.list(page).await.map_err(map_user_error)
    }

    async fn update_profile(&self, id: UserId, profile: UserProfile) -> Result<User, Error> {
        let user = self
            .users
            .update_profile(id, &profile)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| user_not_found(id))?;
        info!(user_id = %id, "profile updated");
        Ok(user)
    }

    async fn change_password(&self, id: UserId, password: NewPassword) -> Result<(), Error> {
        let digest: PasswordDigest = self.hasher.hash(&password).await.map_err(map_hash_error)?;
        let updated = self
            .users
            .update_password(id, &digest)
            .await
            .map_err(map_user_error)?;
        if !updated {
            return Err(user_not_found(id));
        }
        info!(user_id = %id, "password changed");
        Ok(())
    }
}

/// Login port that checks stored passwords and records every authenticated
/// account.
///
/// Accounts with a stored password digest are verified against it and never
/// reach the wrapped authenticator. Otherwise the authenticator decides who
/// may log in; the account is then upserted so profile queries find it. A
/// stored profile survives later logins.
pub struct RecordingLoginService<L, U, H> {
    authenticator: Arc<L>,
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<L, U, H> RecordingLoginService<L, U, H> {
    /// Wrap `authenticator`, recording accounts in `users` and verifying
    /// stored passwords with `hasher`.
    pub fn new(authenticator: Arc<L>, users: Arc<U>, hasher: Arc<H>) -> Self {
        Self {
            authenticator,
            users,
            hasher,
        }
    }
}

#[async_trait]
impl<L, U, H> LoginService for RecordingLoginService<L, U, H>
where
    L: LoginService,
    U: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let stored = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(map_user_error)?;
        if let Some(stored) = stored {
            let matches = self
                .hasher
                .verify(credentials.password(), &stored.digest)
                .await
                .map_err(map_hash_error)?;
            if !matches {
                warn!(user_id = %stored.user.id, "password mismatch");
                return Err(Error::unauthorized("invalid credentials"));
            }
            info!(user_id = %stored.user.id, "login succeeded");
            return Ok(stored.user);
        }

        let user = self.authenticator.authenticate(credentials).await?;
        self.users.upsert(&user).await.map_err(map_user_error)?;
        let stored = self
            .users
            .find(user.id)
            .await
            .map_err(map_user_error)?
            .unwrap_or(user);
        info!(user_id = %stored.id, "login succeeded");
        Ok(stored)
    }
}
