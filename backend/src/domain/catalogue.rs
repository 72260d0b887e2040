//! Classification entities: categories, tags, and authors.
//!
//! These carry only identity, a display name, and a slug. Membership is owned
//! by [`crate::domain::Element`]; "elements of a category" is a query against
//! the element repository, never a stored back-reference.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::element::ElementFilter;
use super::ids::{AuthorId, CategoryId, TagId};
use super::slug::slugify;
use super::validation::{FieldError, TextBounds};

/// Bounds for category titles.
pub const CATEGORY_TITLE_BOUNDS: TextBounds = TextBounds::new(3, 16);
/// Bounds for tag titles.
pub const TAG_TITLE_BOUNDS: TextBounds = TextBounds::new(3, 16);
/// Bounds for author given names.
pub const AUTHOR_NAME_BOUNDS: TextBounds = TextBounds::new(3, 16);
/// Bounds for author surnames.
pub const AUTHOR_SURNAME_BOUNDS: TextBounds = TextBounds::new(3, 32);

/// Behaviour shared by the classification entities so one repository port
/// and one service can manage all three kinds.
pub trait Classification: Clone + Debug + Send + Sync + 'static {
    /// Identifier type.
    type Id: Copy + Eq + Hash + Ord + Debug + Display + Send + Sync + 'static;
    /// Validated create/update payload.
    type Draft: Clone + Debug + Send + Sync + 'static;

    /// Lower-case kind name used in messages and logs.
    const KIND: &'static str;
    /// Whether elements referencing this entity block its deletion.
    const GUARDS_ELEMENTS: bool;

    /// Fresh random identifier.
    fn new_id() -> Self::Id;
    /// Entity identifier.
    fn id(&self) -> Self::Id;
    /// Build a new entity from a draft.
    fn create(id: Self::Id, draft: Self::Draft, now: DateTime<Utc>) -> Self;
    /// Replace editable fields from a draft.
    fn apply(&mut self, draft: Self::Draft, now: DateTime<Utc>);
    /// Filter selecting the elements classified by `id`.
    fn element_filter(id: Self::Id) -> ElementFilter;
    /// Sort key used by list operations.
    fn sort_key(&self) -> String;
}

/// Element category. Every element belongs to exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Identifier.
    pub id: CategoryId,
    /// Display title (3..=16 characters).
    pub title: String,
    /// URL slug derived from the title.
    pub slug: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validated category payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    title: String,
}

impl CategoryDraft {
    /// Validate a category title.
    pub fn new(title: &str) -> Result<Self, FieldError> {
        Ok(Self {
            title: CATEGORY_TITLE_BOUNDS.check(title, "title")?,
        })
    }
}

impl Classification for Category {
    type Id = CategoryId;
    type Draft = CategoryDraft;

    const KIND: &'static str = "category";
    const GUARDS_ELEMENTS: bool = true;

    fn new_id() -> CategoryId {
        CategoryId::random()
    }

    fn id(&self) -> CategoryId {
        self.id
    }

    fn create(id: CategoryId, draft: CategoryDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            slug: slugify(&draft.title),
            title: draft.title,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, draft: CategoryDraft, now: DateTime<Utc>) {
        self.slug = slugify(&draft.title);
        self.title = draft.title;
        self.updated_at = now;
    }

    fn element_filter(id: CategoryId) -> ElementFilter {
        ElementFilter {
            category_id: Some(id),
            ..ElementFilter::default()
        }
    }

    fn sort_key(&self) -> String {
        self.title.to_lowercase()
    }
}

/// Free-form label attached to elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Identifier.
    pub id: TagId,
    /// Display title (3..=16 characters).
    pub title: String,
    /// URL slug derived from the title.
    pub slug: String,
}

/// Validated tag payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDraft {
    title: String,
}

impl TagDraft {
    /// Validate a tag title.
    pub fn new(title: &str) -> Result<Self, FieldError> {
        Ok(Self {
            title: TAG_TITLE_BOUNDS.check(title, "title")?,
        })
    }
}

impl Classification for Tag {
    type Id = TagId;
    type Draft = TagDraft;

    const KIND: &'static str = "tag";
    const GUARDS_ELEMENTS: bool = false;

    fn new_id() -> TagId {
        TagId::random()
    }

    fn id(&self) -> TagId {
        self.id
    }

    fn create(id: TagId, draft: TagDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            slug: slugify(&draft.title),
            title: draft.title,
        }
    }

    fn apply(&mut self, draft: TagDraft, _now: DateTime<Utc>) {
        self.slug = slugify(&draft.title);
        self.title = draft.title;
    }

    fn element_filter(id: TagId) -> ElementFilter {
        ElementFilter {
            tag_id: Some(id),
            ..ElementFilter::default()
        }
    }

    fn sort_key(&self) -> String {
        self.title.to_lowercase()
    }
}

/// Author credited on elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Identifier.
    pub id: AuthorId,
    /// Given name (3..=16 characters).
    pub name: String,
    /// Surname (3..=32 characters).
    pub surname: String,
    /// URL slug derived from the full name.
    pub slug: String,
}

impl Author {
    /// `"{name} {surname}"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// Validated author payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorDraft {
    name: String,
    surname: String,
}

impl AuthorDraft {
    /// Validate author names.
    pub fn new(name: &str, surname: &str) -> Result<Self, FieldError> {
        Ok(Self {
            name: AUTHOR_NAME_BOUNDS.check(name, "name")?,
            surname: AUTHOR_SURNAME_BOUNDS.check(surname, "surname")?,
        })
    }

    fn slug(&self) -> String {
        slugify(&format!("{} {}", self.name, self.surname))
    }
}

impl Classification for Author {
    type Id = AuthorId;
    type Draft = AuthorDraft;

    const KIND: &'static str = "author";
    const GUARDS_ELEMENTS: bool = false;

    fn new_id() -> AuthorId {
        AuthorId::random()
    }

    fn id(&self) -> AuthorId {
        self.id
    }

    fn create(id: AuthorId, draft: AuthorDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            slug: draft.slug(),
            name: draft.name,
            surname: draft.surname,
        }
    }

    fn apply(&mut self, draft: AuthorDraft, _now: DateTime<Utc>) {
        self.slug = draft.slug();
        self.name = draft.name;
        self.surname = draft.surname;
    }

    fn element_filter(id: AuthorId) -> ElementFilter {
        ElementFilter {
            author_id: Some(id),
            ..ElementFilter::default()
        }
    }

    fn sort_key(&self) -> String {
        format!("{} {}", self.surname, self.name).to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn category_slug_follows_title() {
        let now = Utc::now();
        let mut category = Category::create(
            CategoryId::random(),
            CategoryDraft::new("Science Fiction").expect("valid"),
            now,
        );
        assert_eq!(category.slug, "science-fiction");

        category.apply(CategoryDraft::new("Poetry").expect("valid"), now);
        assert_eq!(category.slug, "poetry");
        assert_eq!(category.title, "Poetry");
    }

    #[rstest]
    #[case("ab")]
    #[case("a title that is too long")]
    fn category_titles_are_bounded(#[case] title: &str) {
        assert!(CategoryDraft::new(title).is_err());
    }

    #[rstest]
    fn author_full_name_and_slug() {
        let author = Author::create(
            AuthorId::random(),
            AuthorDraft::new("Ursula", "Le Guin").expect("valid"),
            Utc::now(),
        );
        assert_eq!(author.full_name(), "Ursula Le Guin");
        assert_eq!(author.slug, "ursula-le-guin");
    }

    #[rstest]
    fn only_categories_guard_elements() {
        assert!(Category::GUARDS_ELEMENTS);
        assert!(!Tag::GUARDS_ELEMENTS);
        assert!(!Author::GUARDS_ELEMENTS);
    }

    #[rstest]
    fn filters_select_by_kind() {
        let tag_id = TagId::random();
        let filter = Tag::element_filter(tag_id);
        assert_eq!(filter.tag_id, Some(tag_id));
        assert!(filter.category_id.is_none());
    }
}
