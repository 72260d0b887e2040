//! Driving port for account queries, registration, and self-service edits.

use async_trait::async_trait;

use crate::domain::{
    Error, NewPassword, Page, PageRequest, Registration, User, UserId, UserProfile,
};

/// Account use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    /// Create a reader account with its profile.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Fetch one account.
    async fn get(&self, id: UserId) -> Result<User, Error>;

    /// List all accounts.
    async fn list(&self, page: PageRequest) -> Result<Page<User>, Error>;

    /// Replace the caller's own profile.
    async fn update_profile(&self, id: UserId, profile: UserProfile) -> Result<User, Error>;

    /// Replace the caller's own password.
    async fn change_password(&self, id: UserId, password: NewPassword) -> Result<(), Error>;
}
