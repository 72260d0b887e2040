//! Driving port for login.
//!
//! The fixture implementation knows two development accounts so the API is
//! usable before anyone registers. Accounts with a stored password are
//! verified before the fixture list is consulted.

use async_trait::async_trait;

use crate::domain::{EmailAddress, Error, LoginCredentials, Role, User, UserId, UserProfile};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated account.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

/// Development account accepted by [`FixtureLoginService`].
#[derive(Debug, Clone, Copy)]
pub struct FixtureAccount {
    /// Login e-mail.
    pub email: &'static str,
    /// Plain-text development password.
    pub password: &'static str,
    /// Stable account identifier.
    pub user_id: &'static str,
    /// Granted roles.
    pub roles: &'static [Role],
    /// Given name.
    pub first_name: &'static str,
    /// Family name.
    pub last_name: &'static str,
}

/// Accounts accepted without a credential store.
pub const FIXTURE_ACCOUNTS: &[FixtureAccount] = &[
    FixtureAccount {
        email: "admin@example.org",
        password: "password",
        user_id: "123e4567-e89b-12d3-a456-426614174000",
        roles: &[Role::Admin],
        first_name: "Ada",
        last_name: "Lovelace",
    },
    FixtureAccount {
        email: "reader@example.org",
        password: "password",
        user_id: "3fa85f64-5717-4562-b3fc-2c963f66afa6",
        roles: &[Role::User],
        first_name: "Grace",
        last_name: "Hopper",
    },
];

impl FixtureAccount {
    /// Find the account matching `credentials`.
    pub fn matching(credentials: &LoginCredentials) -> Option<&'static Self> {
        FIXTURE_ACCOUNTS.iter().find(|account| {
            account.email.eq_ignore_ascii_case(credentials.email())
                && account.password == credentials.password()
        })
    }

    /// Materialise the account as a domain user.
    pub fn to_user(&self) -> Result<User, Error> {
        // Constants: surface bad data as internal so tests catch regressions.
        let id = UserId::new(self.user_id)
            .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))?;
        let email = EmailAddress::new(self.email, "email")
            .map_err(|err| Error::internal(format!("invalid fixture email: {err}")))?;
        let profile = UserProfile::new(self.first_name, self.last_name)
            .map_err(|err| Error::internal(format!("invalid fixture profile: {err}")))?;
        Ok(User {
            id,
            email,
            roles: self.roles.to_vec(),
            profile: Some(profile),
        })
    }
}

/// In-memory authenticator over [`FIXTURE_ACCOUNTS`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        FixtureAccount::matching(credentials)
            .ok_or_else(|| Error::unauthorized("invalid credentials"))?
            .to_user()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("admin@example.org", "password", Some(Role::Admin))]
    #[case("READER@example.org", "password", Some(Role::User))]
    #[case("admin@example.org", "wrong", None)]
    #[case("nobody@example.org", "password", None)]
    #[tokio::test]
    async fn fixture_login_matches_known_accounts(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected_role: Option<Role>,
    ) {
        let creds = LoginCredentials::try_from_parts(email, password).expect("credentials shape");
        let result = FixtureLoginService.authenticate(&creds).await;
        match (expected_role, result) {
            (Some(role), Ok(user)) => assert_eq!(user.roles, vec![role]),
            (None, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (expected, other) => panic!("expected {expected:?}, got {other:?}"),
        }
    }

    #[rstest]
    fn every_fixture_account_is_well_formed() {
        for account in FIXTURE_ACCOUNTS {
            let user = account.to_user().expect("fixture account");
            assert_eq!(user.email.as_str(), account.email);
        }
    }
}
