//! Port for user account persistence.
use async_trait::async_trait;

use crate::domain::{Page, PageRequest, PasswordDigest, User, UserId, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the e-mail address.
        EmailTaken { email: String } => "email already registered: {email}",
    }
}

/// Account together with its stored password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// The account.
    pub user: User,
    /// Digest of the account's password.
    pub digest: PasswordDigest,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or update an account, keeping an existing profile.
    async fn upsert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Insert a self-registered account with its password digest.
    ///
    /// E-mails are compared case-insensitively; a clash yields
    /// [`UserRepositoryError::EmailTaken`].
    async fn register(
        &self,
        user: &User,
        digest: &PasswordDigest,
    ) -> Result<(), UserRepositoryError>;

    /// Account and digest for a login e-mail, matched case-insensitively.
    /// Accounts without a stored password yield `None`.
    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// List users ordered by e-mail.
    async fn list(&self, page: PageRequest) -> Result<Page<User>, UserRepositoryError>;

    /// Replace a user's profile. Returns the updated account, or `None` when
    /// missing.
    async fn update_profile(
        &self,
        id: UserId,
        profile: &UserProfile,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Replace a user's password digest. Returns `false` when the account is
    /// missing.
    async fn update_password(
        &self,
        id: UserId,
        digest: &PasswordDigest,
    ) -> Result<bool, UserRepositoryError>;
}
