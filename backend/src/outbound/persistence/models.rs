//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions that can meet bad stored data
//! return a message for the repository to wrap as a query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Author, AuthorId, Category, CategoryId, Element, ElementId, EmailAddress, Requester,
    Reservation, ReservationId, Role, Tag, TagId, User, UserId, UserProfile,
};

use super::schema::{authors, categories, elements, reservations, tags, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Insertable struct for first-time logins.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub roles: Vec<String>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            email: user.email.as_str(),
            roles: user.roles.iter().map(|role| role.as_str().to_owned()).collect(),
            first_name: user.profile.as_ref().map(UserProfile::first_name),
            last_name: user.profile.as_ref().map(UserProfile::last_name),
        }
    }
}

/// Insertable struct for self-registered accounts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewCredentialRow<'a> {
    #[diesel(embed)]
    pub user: NewUserRow<'a>,
    pub password_hash: &'a str,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = EmailAddress::new(&row.email, "email").map_err(|err| err.to_string())?;
        let roles = row
            .roles
            .iter()
            .map(|raw| raw.parse::<Role>().map_err(|err| err.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        let profile = match (row.first_name, row.last_name) {
            (Some(first), Some(last)) => {
                Some(UserProfile::new(&first, &last).map_err(|err| err.to_string())?)
            }
            _ => None,
        };
        Ok(Self {
            id: UserId::from_uuid(row.id),
            email,
            roles,
            profile,
        })
    }
}

// ---------------------------------------------------------------------------
// Classifications
// ---------------------------------------------------------------------------

/// Row struct for the categories table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset for category edits.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = categories)]
pub(crate) struct CategoryUpdate<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::from_uuid(row.id),
            title: row.title,
            slug: row.slug,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&Category> for CategoryRow {
    fn from(entry: &Category) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            title: entry.title.clone(),
            slug: entry.slug.clone(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

impl<'a> From<&'a Category> for CategoryUpdate<'a> {
    fn from(entry: &'a Category) -> Self {
        Self {
            title: &entry.title,
            slug: &entry.slug,
            updated_at: entry.updated_at,
        }
    }
}

/// Row struct for the tags table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TagRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

/// Changeset for tag edits.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tags)]
pub(crate) struct TagUpdate<'a> {
    pub title: &'a str,
    pub slug: &'a str,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: TagId::from_uuid(row.id),
            title: row.title,
            slug: row.slug,
        }
    }
}

impl From<&Tag> for TagRow {
    fn from(entry: &Tag) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            title: entry.title.clone(),
            slug: entry.slug.clone(),
        }
    }
}

impl<'a> From<&'a Tag> for TagUpdate<'a> {
    fn from(entry: &'a Tag) -> Self {
        Self {
            title: &entry.title,
            slug: &entry.slug,
        }
    }
}

/// Row struct for the authors table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = authors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuthorRow {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub slug: String,
}

/// Changeset for author edits.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = authors)]
pub(crate) struct AuthorUpdate<'a> {
    pub name: &'a str,
    pub surname: &'a str,
    pub slug: &'a str,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: AuthorId::from_uuid(row.id),
            name: row.name,
            surname: row.surname,
            slug: row.slug,
        }
    }
}

impl From<&Author> for AuthorRow {
    fn from(entry: &Author) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            name: entry.name.clone(),
            surname: entry.surname.clone(),
            slug: entry.slug.clone(),
        }
    }
}

impl<'a> From<&'a Author> for AuthorUpdate<'a> {
    fn from(entry: &'a Author) -> Self {
        Self {
            name: &entry.name,
            surname: &entry.surname,
            slug: &entry.slug,
        }
    }
}

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

/// Row struct for the elements table. Tag and author links live in their
/// own tables.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = elements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ElementRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub stock: i32,
    pub category_id: Uuid,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Changeset for element edits, stock included.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = elements)]
pub(crate) struct ElementUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub stock: i32,
    pub category_id: Uuid,
    pub slug: &'a str,
}

/// Convert a stored stock counter, rejecting negative values.
pub(crate) fn stock_from_row(stock: i32) -> Result<u32, String> {
    u32::try_from(stock).map_err(|_| format!("negative stock {stock} in storage"))
}

/// Convert a domain stock counter to its column type.
pub(crate) fn stock_to_row(stock: u32) -> Result<i32, String> {
    i32::try_from(stock).map_err(|_| format!("stock {stock} exceeds storage range"))
}

impl ElementRow {
    /// Build the row for `element`.
    pub(crate) fn from_element(element: &Element) -> Result<Self, String> {
        Ok(Self {
            id: *element.id.as_uuid(),
            title: element.title.clone(),
            description: element.description.clone(),
            stock: stock_to_row(element.stock)?,
            category_id: *element.category_id.as_uuid(),
            slug: element.slug.clone(),
            created_at: element.created_at,
        })
    }

    /// Combine the row with its link ids.
    pub(crate) fn into_element(
        self,
        tag_ids: Vec<TagId>,
        author_ids: Vec<AuthorId>,
    ) -> Result<Element, String> {
        Ok(Element {
            id: ElementId::from_uuid(self.id),
            title: self.title,
            description: self.description,
            stock: stock_from_row(self.stock)?,
            category_id: CategoryId::from_uuid(self.category_id),
            tag_ids,
            author_ids,
            slug: self.slug,
            created_at: self.created_at,
        })
    }
}

impl<'a> ElementUpdate<'a> {
    /// Build the changeset for `element`.
    pub(crate) fn from_element(element: &'a Element) -> Result<Self, String> {
        Ok(Self {
            title: &element.title,
            description: &element.description,
            stock: stock_to_row(element.stock)?,
            category_id: *element.category_id.as_uuid(),
            slug: &element.slug,
        })
    }
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

/// Row struct for the reservations table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReservationRow {
    pub id: Uuid,
    pub element_id: Uuid,
    pub status: String,
    pub email: String,
    pub nickname: String,
    pub user_id: Option<Uuid>,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Reservation> for ReservationRow {
    fn from(reservation: &Reservation) -> Self {
        Self {
            id: *reservation.id.as_uuid(),
            element_id: *reservation.element_id.as_uuid(),
            status: reservation.status.as_str().to_owned(),
            email: reservation.requester.email.as_str().to_owned(),
            nickname: reservation.requester.nickname.clone(),
            user_id: reservation.requester.user_id.map(|id| *id.as_uuid()),
            comment: reservation.comment.clone(),
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
        }
    }
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = String;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|_| {
            format!("unknown reservation status '{}' in storage", row.status)
        })?;
        let email = EmailAddress::new(&row.email, "email").map_err(|err| err.to_string())?;
        Ok(Self {
            id: ReservationId::from_uuid(row.id),
            element_id: ElementId::from_uuid(row.element_id),
            status,
            requester: Requester {
                email,
                nickname: row.nickname,
                user_id: row.user_id.map(UserId::from_uuid),
            },
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
