//! Borrowable catalogue items and their stock counter.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AuthorId, CategoryId, ElementId, TagId};
use super::slug::slugify;
use super::validation::{FieldError, TextBounds};

/// Bounds for element titles.
pub const ELEMENT_TITLE_BOUNDS: TextBounds = TextBounds::new(3, 255);
/// Bounds for element descriptions.
pub const ELEMENT_DESCRIPTION_BOUNDS: TextBounds = TextBounds::new(3, 255);

/// Catalogue item available for reservation.
///
/// ## Invariants
/// - `stock` is never negative; the unsigned type enforces it and adapters
///   only decrement through a conditional update.
/// - `tag_ids` and `author_ids` are the authoritative membership collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Identifier.
    pub id: ElementId,
    /// Display title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Units currently available to lend.
    pub stock: u32,
    /// Owning category.
    pub category_id: CategoryId,
    /// Attached tags, sorted and de-duplicated.
    pub tag_ids: Vec<TagId>,
    /// Credited authors, sorted and de-duplicated.
    pub author_ids: Vec<AuthorId>,
    /// URL slug derived from the title.
    pub slug: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Element {
    /// Build a new element from a validated draft.
    pub fn create(id: ElementId, draft: ElementDraft, now: DateTime<Utc>) -> Self {
        let ElementDraft {
            title,
            description,
            stock,
            category_id,
            tag_ids,
            author_ids,
        } = draft;
        Self {
            id,
            slug: slugify(&title),
            title,
            description,
            stock,
            category_id,
            tag_ids: tag_ids.into_iter().collect(),
            author_ids: author_ids.into_iter().collect(),
            created_at: now,
        }
    }

    /// Replace the editable fields from a validated draft.
    pub fn apply(&mut self, draft: ElementDraft) {
        let ElementDraft {
            title,
            description,
            stock,
            category_id,
            tag_ids,
            author_ids,
        } = draft;
        self.slug = slugify(&title);
        self.title = title;
        self.description = description;
        self.stock = stock;
        self.category_id = category_id;
        self.tag_ids = tag_ids.into_iter().collect();
        self.author_ids = author_ids.into_iter().collect();
    }

    /// Whether the element matches every populated criterion of `filter`.
    pub fn matches(&self, filter: &ElementFilter) -> bool {
        filter.category_id.is_none_or(|id| self.category_id == id)
            && filter.tag_id.is_none_or(|id| self.tag_ids.contains(&id))
            && filter.author_id.is_none_or(|id| self.author_ids.contains(&id))
    }
}

/// Validated element payload for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDraft {
    title: String,
    description: String,
    stock: u32,
    category_id: CategoryId,
    tag_ids: BTreeSet<TagId>,
    author_ids: BTreeSet<AuthorId>,
}

/// Raw element fields before validation.
#[derive(Debug, Clone, Default)]
pub struct ElementInput<'a> {
    /// Title text.
    pub title: &'a str,
    /// Description text.
    pub description: &'a str,
    /// Initial or replacement stock.
    pub stock: u32,
    /// Owning category.
    pub category_id: Option<CategoryId>,
    /// Tags to attach.
    pub tag_ids: Vec<TagId>,
    /// Authors to credit.
    pub author_ids: Vec<AuthorId>,
}

impl ElementDraft {
    /// Validate raw element fields.
    ///
    /// # Examples
    /// ```
    /// use lending_backend::domain::{CategoryId, ElementDraft, ElementInput};
    ///
    /// let draft = ElementDraft::new(ElementInput {
    ///     title: "Dune",
    ///     description: "Desert planet saga",
    ///     stock: 2,
    ///     category_id: Some(CategoryId::random()),
    ///     ..ElementInput::default()
    /// });
    /// assert!(draft.is_ok());
    /// ```
    pub fn new(input: ElementInput<'_>) -> Result<Self, FieldError> {
        let category_id = input
            .category_id
            .ok_or(FieldError::Empty { field: "categoryId" })?;
        Ok(Self {
            title: ELEMENT_TITLE_BOUNDS.check(input.title, "title")?,
            description: ELEMENT_DESCRIPTION_BOUNDS.check(input.description, "description")?,
            stock: input.stock,
            category_id,
            tag_ids: input.tag_ids.into_iter().collect(),
            author_ids: input.author_ids.into_iter().collect(),
        })
    }

    /// Owning category.
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    /// Tags to attach.
    pub fn tag_ids(&self) -> impl Iterator<Item = &TagId> {
        self.tag_ids.iter()
    }

    /// Authors to credit.
    pub fn author_ids(&self) -> impl Iterator<Item = &AuthorId> {
        self.author_ids.iter()
    }
}

/// Optional criteria for listing elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementFilter {
    /// Restrict to one category.
    pub category_id: Option<CategoryId>,
    /// Restrict to elements carrying this tag.
    pub tag_id: Option<TagId>,
    /// Restrict to elements crediting this author.
    pub author_id: Option<AuthorId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn category_id() -> CategoryId {
        CategoryId::random()
    }

    fn input(category_id: CategoryId) -> ElementInput<'static> {
        ElementInput {
            title: "The Left Hand of Darkness",
            description: "Winter planet novel",
            stock: 3,
            category_id: Some(category_id),
            ..ElementInput::default()
        }
    }

    #[rstest]
    fn create_derives_slug_and_dedupes_links(category_id: CategoryId) {
        let tag = TagId::random();
        let draft = ElementDraft::new(ElementInput {
            tag_ids: vec![tag, tag],
            ..input(category_id)
        })
        .expect("valid draft");
        let element = Element::create(ElementId::random(), draft, Utc::now());
        assert_eq!(element.slug, "the-left-hand-of-darkness");
        assert_eq!(element.tag_ids, vec![tag]);
        assert_eq!(element.stock, 3);
    }

    #[rstest]
    fn missing_category_is_rejected() {
        let err = ElementDraft::new(ElementInput {
            category_id: None,
            ..input(CategoryId::random())
        })
        .expect_err("category required");
        assert_eq!(err.field(), "categoryId");
    }

    #[rstest]
    #[case("ab", "Valid description", "title")]
    #[case("Valid title", "no", "description")]
    fn text_fields_are_bounded(
        category_id: CategoryId,
        #[case] title: &'static str,
        #[case] description: &'static str,
        #[case] field: &str,
    ) {
        let err = ElementDraft::new(ElementInput {
            title,
            description,
            ..input(category_id)
        })
        .expect_err("invalid draft");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn filter_matches_all_criteria(category_id: CategoryId) {
        let tag = TagId::random();
        let draft = ElementDraft::new(ElementInput {
            tag_ids: vec![tag],
            ..input(category_id)
        })
        .expect("valid draft");
        let element = Element::create(ElementId::random(), draft, Utc::now());

        assert!(element.matches(&ElementFilter::default()));
        assert!(element.matches(&ElementFilter {
            category_id: Some(category_id),
            tag_id: Some(tag),
            author_id: None,
        }));
        assert!(!element.matches(&ElementFilter {
            tag_id: Some(TagId::random()),
            ..ElementFilter::default()
        }));
    }
}
