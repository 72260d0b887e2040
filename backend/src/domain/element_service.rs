//! Element maintenance and browsing.
//!
//! Creating or editing an element checks that the referenced category, tags,
//! and authors exist before anything is written.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use super::ports::{ClassificationRepository, ElementCatalogue, ElementRepository};
use super::repository_error_mapping::{map_catalogue_error, map_element_error};
use super::{
    Author, Category, Classification, Element, ElementDraft, ElementFilter, ElementId, Error, Page,
    PageRequest, Tag,
};

/// Element service implementing [`ElementCatalogue`].
#[derive(Clone)]
pub struct ElementService<E, C, T, A> {
    elements: Arc<E>,
    categories: Arc<C>,
    tags: Arc<T>,
    authors: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<E, C, T, A> ElementService<E, C, T, A> {
    /// Create a new service with the given repositories and timestamp source.
    pub fn new(
        elements: Arc<E>,
        categories: Arc<C>,
        tags: Arc<T>,
        authors: Arc<A>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            elements,
            categories,
            tags,
            authors,
            clock,
        }
    }
}

fn unknown_reference(field: &str, id: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("{field} refers to an unknown entry")).with_details(json!({
        "field": field,
        "code": "unknown_reference",
        "value": id.to_string(),
    }))
}

async fn check_references<K, R>(repo: &R, field: &str, ids: &[K::Id]) -> Result<(), Error>
where
    K: Classification,
    R: ClassificationRepository<K>,
{
    if ids.is_empty() {
        return Ok(());
    }
    match repo
        .first_missing(ids)
        .await
        .map_err(|err| map_catalogue_error(K::KIND, err))?
    {
        Some(missing) => Err(unknown_reference(field, missing)),
        None => Ok(()),
    }
}

impl<E, C, T, A> ElementService<E, C, T, A>
where
    E: ElementRepository,
    C: ClassificationRepository<Category>,
    T: ClassificationRepository<Tag>,
    A: ClassificationRepository<Author>,
{
    async fn validate_references(&self, draft: &ElementDraft) -> Result<(), Error> {
        check_references::<Category, C>(self.categories.as_ref(), "categoryId", &[draft.category_id()])
            .await?;
        let tag_ids: Vec<_> = draft.tag_ids().copied().collect();
        check_references::<Tag, T>(self.tags.as_ref(), "tagIds", &tag_ids).await?;
        let author_ids: Vec<_> = draft.author_ids().copied().collect();
        check_references::<Author, A>(self.authors.as_ref(), "authorIds", &author_ids).await
    }

    async fn load(&self, id: ElementId) -> Result<Element, Error> {
        self.elements
            .find(id)
            .await
            .map_err(map_element_error)?
            .ok_or_else(|| element_not_found(id))
    }
}

fn element_not_found(id: ElementId) -> Error {
    Error::not_found(format!("element {id} not found"))
}

#[async_trait]
impl<E, C, T, A> ElementCatalogue for ElementService<E, C, T, A>
where
    E: ElementRepository,
    C: ClassificationRepository<Category>,
    T: ClassificationRepository<Tag>,
    A: ClassificationRepository<Author>,
{
    async fn list(&self, filter: ElementFilter, page: PageRequest) -> Result<Page<Element>, Error> {
        self.elements
            .list(filter, page)
            .await
            .map_err(map_element_error)
    }

    async fn get(&self, id: ElementId) -> Result<Element, Error> {
        self.load(id).await
    }

    async fn create(&self, draft: ElementDraft) -> Result<Element, Error> {
        self.validate_references(&draft).await?;
        let element = Element::create(ElementId::random(), draft, self.clock.utc());
        self.elements
            .insert(&element)
            .await
            .map_err(map_element_error)?;
        info!(element_id = %element.id, stock = element.stock, "element created");
        Ok(element)
    }

    async fn update(&self, id: ElementId, draft: ElementDraft) -> Result<Element, Error> {
        let mut element = self.load(id).await?;
        self.validate_references(&draft).await?;
        element.apply(draft);
        let updated = self
            .elements
            .update(&element)
            .await
            .map_err(map_element_error)?;
        if updated {
            Ok(element)
        } else {
            Err(element_not_found(id))
        }
    }

    async fn delete(&self, id: ElementId) -> Result<(), Error> {
        let deleted = self
            .elements
            .delete(id)
            .await
            .map_err(map_element_error)?;
        if !deleted {
            return Err(element_not_found(id));
        }
        info!(element_id = %id, "element deleted");
        Ok(())
    }
}
