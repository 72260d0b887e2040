//! Port for password hashing.
//!
//! Digests are opaque to the domain; adapters choose the algorithm and encode
//! its parameters in the digest so stored hashes stay verifiable.

use async_trait::async_trait;

use crate::domain::{NewPassword, PasswordDigest};

use super::define_port_error;

define_port_error! {
    /// Failures raised by password hashing adapters.
    pub enum PasswordHashError {
        /// Hashing could not complete.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored digest could not be parsed.
        Digest { message: String } => "stored password digest is invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a newly chosen password with a fresh salt.
    async fn hash(&self, password: &NewPassword) -> Result<PasswordDigest, PasswordHashError>;

    /// Whether `password` matches `digest`.
    async fn verify(
        &self,
        password: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError>;
}
