//! Argon2id implementation of the [`PasswordHasher`] port.
//!
//! Hashing is CPU-bound, so both operations run on Tokio's blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{NewPassword, PasswordDigest};

/// Argon2id hasher producing PHC-encoded digests.
///
/// Verification reads the parameters stored in each digest, so raising the
/// cost later keeps older hashes valid.
///
/// # Examples
/// ```
/// use lending_backend::outbound::password::Argon2PasswordHasher;
///
/// let hasher = Argon2PasswordHasher::default();
/// let _copy = hasher.clone();
/// ```
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// Build a hasher with explicit cost parameters.
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, PasswordHashError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PasswordHashError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|error| PasswordHashError::hash(error.to_string()))?
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &NewPassword) -> Result<PasswordDigest, PasswordHashError> {
        let argon2 = self.argon2();
        let plain = Zeroizing::new(password.expose().to_owned());
        run_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            password_hash::PasswordHasher::hash_password(&argon2, plain.as_bytes(), &salt)
                .map(|hash| PasswordDigest::new(hash.to_string()))
                .map_err(|error| PasswordHashError::hash(error.to_string()))
        })
        .await
    }

    async fn verify(
        &self,
        password: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError> {
        let argon2 = self.argon2();
        let plain = Zeroizing::new(password.to_owned());
        let encoded = digest.as_str().to_owned();
        run_blocking(move || {
            let parsed = PasswordHash::new(&encoded)
                .map_err(|error| PasswordHashError::digest(error.to_string()))?;
            match password_hash::PasswordVerifier::verify_password(
                &argon2,
                plain.as_bytes(),
                &parsed,
            ) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(error) => Err(PasswordHashError::hash(error.to_string())),
            }
        })
        .await
    }
}
