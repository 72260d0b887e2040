//! Users, roles, and the acting principal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{FieldError, TextBounds};

/// Bounds for a user's first name.
pub const FIRST_NAME_BOUNDS: TextBounds = TextBounds::new(3, 16);
/// Bounds for a user's last name.
pub const LAST_NAME_BOUNDS: TextBounds = TextBounds::new(3, 32);
/// Maximum stored e-mail length.
pub const EMAIL_MAX: usize = 180;

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its string form.
    ///
    /// # Examples
    /// ```
    /// use lending_backend::domain::UserId;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, FieldError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(FieldError::Malformed { field: "userId" });
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| FieldError::Malformed { field: "userId" })
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role granted to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Registered reader.
    #[serde(rename = "ROLE_USER")]
    User,
    /// Catalogue administrator.
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    /// Canonical role name as stored and serialised.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
        }
    }

    /// Whether holding `self` satisfies a requirement for `required`.
    ///
    /// Administrators inherit every user permission.
    pub fn satisfies(self, required: Self) -> bool {
        self == required || matches!((self, required), (Self::Admin, Self::User))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Self::User),
            "ROLE_ADMIN" => Ok(Self::Admin),
            _ => Err(FieldError::Malformed { field: "roles" }),
        }
    }
}

/// Caller on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// No authenticated session.
    Anonymous,
    /// Authenticated user with the roles recorded at login.
    Authenticated {
        /// Authenticated user identifier.
        user_id: UserId,
        /// Roles held by the user.
        roles: Vec<Role>,
    },
}

impl Actor {
    /// Build an authenticated actor.
    pub fn authenticated(user_id: UserId, roles: impl IntoIterator<Item = Role>) -> Self {
        Self::Authenticated {
            user_id,
            roles: roles.into_iter().collect(),
        }
    }

    /// Identifier of the authenticated user, if any.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user_id, .. } => Some(user_id),
        }
    }

    /// Whether the actor holds `required`, honouring the role hierarchy.
    pub fn holds(&self, required: Role) -> bool {
        match self {
            Self::Anonymous => false,
            Self::Authenticated { roles, .. } => {
                roles.iter().any(|held| held.satisfies(required))
            }
        }
    }
}

/// Validated e-mail address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate an e-mail address: one `@` with a non-empty local part and a
    /// dotted domain, at most [`EMAIL_MAX`] characters.
    pub fn new(raw: &str, field: &'static str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldError::Empty { field });
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(FieldError::TooLong {
                field,
                max: EMAIL_MAX,
            });
        }
        let well_formed = trimmed.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        });
        if !well_formed || trimmed.contains(char::is_whitespace) {
            return Err(FieldError::Malformed { field });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value, "email")
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Personal details a user may edit about themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    first_name: String,
    last_name: String,
}

impl UserProfile {
    /// Validate names against their bounds.
    pub fn new(first_name: &str, last_name: &str) -> Result<Self, FieldError> {
        Ok(Self {
            first_name: FIRST_NAME_BOUNDS.check(first_name, "firstName")?,
            last_name: LAST_NAME_BOUNDS.check(last_name, "lastName")?,
        })
    }

    /// Given name.
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Family name.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }
}

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Login e-mail.
    pub email: EmailAddress,
    /// Granted roles.
    pub roles: Vec<Role>,
    /// Optional personal details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

impl User {
    /// The acting principal for this account.
    pub fn actor(&self) -> Actor {
        Actor::authenticated(self.id, self.roles.iter().copied())
    }
}
