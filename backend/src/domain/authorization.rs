//! Access policy: which role each (action, resource kind) pair requires.
//!
//! [`vote`] is a pure lookup over [`POLICY`]. It never consults shared state,
//! so the same inputs always produce the same [`Vote`].

use std::fmt;
use std::str::FromStr;

use super::error::Error;
use super::user::{Actor, Role};

/// Action an actor attempts on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create a resource.
    Create,
    /// Read a single resource.
    View,
    /// Modify a resource.
    Edit,
    /// Remove a resource.
    Delete,
    /// Accept a reservation.
    Accept,
    /// Mark a reservation returned.
    Return,
    /// List resources of a kind.
    Index,
}

impl Action {
    /// Attribute name as used in policy decisions.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::View => "VIEW",
            Self::Edit => "EDIT",
            Self::Delete => "DELETE",
            Self::Accept => "ACCEPT",
            Self::Return => "RETURN",
            Self::Index => "INDEX",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute name not known to the policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported attribute: {0}")]
pub struct UnsupportedAttribute(pub String);

impl FromStr for Action {
    type Err = UnsupportedAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(Self::Create),
            "VIEW" => Ok(Self::View),
            "EDIT" => Ok(Self::Edit),
            "DELETE" => Ok(Self::Delete),
            "ACCEPT" => Ok(Self::Accept),
            "RETURN" => Ok(Self::Return),
            "INDEX" => Ok(Self::Index),
            other => Err(UnsupportedAttribute(other.to_owned())),
        }
    }
}

/// Kind of resource an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Element category.
    Category,
    /// Catalogue element.
    Element,
    /// Tag.
    Tag,
    /// Author.
    Author,
    /// Reservation.
    Reservation,
    /// A user's own account data.
    UserData,
}

impl ResourceKind {
    /// Lower-case name for messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Element => "element",
            Self::Tag => "tag",
            Self::Author => "author",
            Self::Reservation => "reservation",
            Self::UserData => "user data",
        }
    }
}

/// Policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    /// The actor may proceed.
    Allow,
    /// The actor may not proceed.
    Deny,
    /// The policy has no rule for this request.
    Abstain,
}

/// One policy row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Action the rule covers.
    pub action: Action,
    /// Resource kind the rule covers.
    pub resource: ResourceKind,
    /// Role the actor must hold.
    pub required: Role,
}

const fn admin(action: Action, resource: ResourceKind) -> Rule {
    Rule {
        action,
        resource,
        required: Role::Admin,
    }
}

const fn user(action: Action, resource: ResourceKind) -> Rule {
    Rule {
        action,
        resource,
        required: Role::User,
    }
}

/// The access policy. Pairs absent from the table abstain.
pub const POLICY: &[Rule] = &[
    admin(Action::Create, ResourceKind::Category),
    admin(Action::View, ResourceKind::Category),
    admin(Action::Edit, ResourceKind::Category),
    admin(Action::Delete, ResourceKind::Category),
    admin(Action::Create, ResourceKind::Element),
    admin(Action::View, ResourceKind::Element),
    admin(Action::Edit, ResourceKind::Element),
    admin(Action::Delete, ResourceKind::Element),
    admin(Action::Create, ResourceKind::Tag),
    admin(Action::View, ResourceKind::Tag),
    admin(Action::Edit, ResourceKind::Tag),
    admin(Action::Delete, ResourceKind::Tag),
    admin(Action::Create, ResourceKind::Author),
    admin(Action::View, ResourceKind::Author),
    admin(Action::Edit, ResourceKind::Author),
    admin(Action::Delete, ResourceKind::Author),
    admin(Action::Create, ResourceKind::Reservation),
    admin(Action::View, ResourceKind::Reservation),
    admin(Action::Edit, ResourceKind::Reservation),
    admin(Action::Delete, ResourceKind::Reservation),
    admin(Action::Accept, ResourceKind::Reservation),
    admin(Action::Return, ResourceKind::Reservation),
    user(Action::View, ResourceKind::UserData),
    user(Action::Edit, ResourceKind::UserData),
    admin(Action::Index, ResourceKind::UserData),
];

/// Role required for `action` on `resource`, if the policy covers it.
pub fn required_role(action: Action, resource: ResourceKind) -> Option<Role> {
    POLICY
        .iter()
        .find(|rule| rule.action == action && rule.resource == resource)
        .map(|rule| rule.required)
}

/// Decide whether `actor` may perform `attribute` on `resource`.
///
/// Unknown attributes and uncovered pairs abstain. Anonymous actors are
/// denied every covered pair.
///
/// # Examples
/// ```
/// use lending_backend::domain::{vote, Actor, ResourceKind, Role, UserId, Vote};
///
/// let admin = Actor::authenticated(UserId::random(), [Role::Admin]);
/// let reader = Actor::authenticated(UserId::random(), [Role::User]);
///
/// assert_eq!(vote("ACCEPT", ResourceKind::Reservation, &admin), Vote::Allow);
/// assert_eq!(vote("ACCEPT", ResourceKind::Reservation, &reader), Vote::Deny);
/// assert_eq!(vote("BORROW", ResourceKind::Reservation, &admin), Vote::Abstain);
/// ```
pub fn vote(attribute: &str, resource: ResourceKind, actor: &Actor) -> Vote {
    match attribute.parse::<Action>() {
        Ok(action) => decide(action, resource, actor),
        Err(_) => Vote::Abstain,
    }
}

/// Typed variant of [`vote`].
pub fn decide(action: Action, resource: ResourceKind, actor: &Actor) -> Vote {
    match required_role(action, resource) {
        None => Vote::Abstain,
        Some(required) if actor.holds(required) => Vote::Allow,
        Some(_) => Vote::Deny,
    }
}

/// Enforce the policy, turning anything but [`Vote::Allow`] into an error.
///
/// Anonymous actors receive `unauthorized`; authenticated actors receive
/// `forbidden`. An abstaining policy denies.
pub fn authorize(action: Action, resource: ResourceKind, actor: &Actor) -> Result<(), Error> {
    match decide(action, resource, actor) {
        Vote::Allow => Ok(()),
        Vote::Deny | Vote::Abstain if matches!(actor, Actor::Anonymous) => {
            Err(Error::unauthorized("login required"))
        }
        Vote::Deny | Vote::Abstain => Err(Error::forbidden(format!(
            "{} on {} is not permitted",
            action.as_str(),
            resource.as_str()
        ))),
    }
}
