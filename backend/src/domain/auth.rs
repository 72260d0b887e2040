//! Login credentials, chosen passwords, and self-registration input.
//!
//! Hashing lives behind [`crate::domain::ports::PasswordHasher`] and
//! credential storage behind [`crate::domain::ports::UserRepository`]; this
//! module only shapes the input.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, UserProfile};
use super::validation::{FieldError, TextBounds};

/// Bounds for a newly chosen password. Whitespace counts.
pub const PASSWORD_BOUNDS: TextBounds = TextBounds::new(6, 191);

/// Returned when a login payload is incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// E-mail was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Login credentials with the password held in zeroising storage.
///
/// The e-mail is trimmed; the password keeps caller whitespace.
///
/// # Examples
/// ```
/// use lending_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" admin@example.org ", "password").unwrap();
/// assert_eq!(creds.email(), "admin@example.org");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Login e-mail.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Password picked at registration or on a password change.
///
/// Unlike other text fields the value is not trimmed.
///
/// # Examples
/// ```
/// use lending_backend::domain::{FieldError, NewPassword};
///
/// assert!(NewPassword::new("hunter22").is_ok());
/// assert!(matches!(NewPassword::new("abc"), Err(FieldError::TooShort { .. })));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Check `raw` against [`PASSWORD_BOUNDS`].
    pub fn new(raw: &str) -> Result<Self, FieldError> {
        const FIELD: &str = "password";
        if raw.is_empty() {
            return Err(FieldError::Empty { field: FIELD });
        }
        let length = raw.chars().count();
        if length < PASSWORD_BOUNDS.min {
            return Err(FieldError::TooShort {
                field: FIELD,
                min: PASSWORD_BOUNDS.min,
            });
        }
        if length > PASSWORD_BOUNDS.max {
            return Err(FieldError::TooLong {
                field: FIELD,
                max: PASSWORD_BOUNDS.max,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Plain-text password, for hashing only.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NewPassword(..)")
    }
}

/// Encoded password hash in PHC string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap an encoded hash produced by a hasher or read from storage.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded hash.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated self-registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Login e-mail for the new account.
    pub email: EmailAddress,
    /// Chosen password.
    pub password: NewPassword,
    /// Profile stored with the account.
    pub profile: UserProfile,
}

impl Registration {
    /// Validate every registration field, reporting the first failure.
    pub fn new(
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Self, FieldError> {
        Ok(Self {
            email: EmailAddress::new(email, "email")?,
            password: NewPassword::new(password)?,
            profile: UserProfile::new(first_name, last_name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("  ", "pw", LoginValidationError::EmptyEmail)]
    #[case("reader@example.org", "", LoginValidationError::EmptyPassword)]
    fn rejects_incomplete_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password).expect_err("must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("reader@example.org", " secret ")
            .expect("valid credentials");
        assert_eq!(creds.password(), " secret ");
    }

    #[rstest]
    #[case("", "empty")]
    #[case("12345", "too_short")]
    fn rejects_weak_passwords(#[case] raw: &str, #[case] code: &str) {
        let err = NewPassword::new(raw).expect_err("must fail");
        assert_eq!(err.field(), "password");
        assert_eq!(err.code(), code);
    }

    #[rstest]
    fn password_length_counts_characters_and_whitespace() {
        assert!(NewPassword::new("  ab  ").is_ok());
        assert!(NewPassword::new(&"é".repeat(191)).is_ok());
        let err = NewPassword::new(&"x".repeat(192)).expect_err("too long");
        assert_eq!(err.code(), "too_long");
    }

    #[rstest]
    fn passwords_are_redacted_in_debug_output() {
        let password = NewPassword::new("hunter22").expect("password");
        assert_eq!(format!("{password:?}"), "NewPassword(..)");
    }

    #[rstest]
    #[case("not-an-email", "secret1", "Grace", "Hopper", "email")]
    #[case("grace@example.org", "short", "Grace", "Hopper", "password")]
    #[case("grace@example.org", "secret1", "Gr", "Hopper", "firstName")]
    #[case("grace@example.org", "secret1", "Grace", "Ho", "lastName")]
    fn registration_reports_the_failing_field(
        #[case] email: &str,
        #[case] password: &str,
        #[case] first: &str,
        #[case] last: &str,
        #[case] field: &str,
    ) {
        let err = Registration::new(email, password, first, last).expect_err("invalid");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn registration_trims_the_email_and_names() {
        let registration = Registration::new(" grace@example.org ", "secret1", " Grace ", "Hopper")
            .expect("valid");
        assert_eq!(registration.email.as_str(), "grace@example.org");
        assert_eq!(registration.profile.first_name(), "Grace");
        assert_eq!(registration.password.expose(), "secret1");
    }
}
