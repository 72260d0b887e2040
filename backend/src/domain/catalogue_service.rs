//! Category, tag, and author maintenance.
//!
//! One generic service covers the three classification kinds. Deleting a
//! category that still holds elements is refused; tags and authors are
//! detached from their elements by the repository instead.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use super::ports::{ClassificationCatalogue, ClassificationRepository, ElementRepository};
use super::repository_error_mapping::{map_catalogue_error, map_element_error};
use super::{Classification, Element, Error, Page, PageRequest};

/// Classification service implementing [`ClassificationCatalogue`].
pub struct ClassificationService<C, R, E> {
    entries: Arc<R>,
    elements: Arc<E>,
    clock: Arc<dyn Clock>,
    kind: PhantomData<fn() -> C>,
}

impl<C, R, E> Clone for ClassificationService<C, R, E> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            elements: Arc::clone(&self.elements),
            clock: Arc::clone(&self.clock),
            kind: PhantomData,
        }
    }
}

impl<C, R, E> ClassificationService<C, R, E> {
    /// Create a new service with the given repositories and timestamp source.
    pub fn new(entries: Arc<R>, elements: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries,
            elements,
            clock,
            kind: PhantomData,
        }
    }
}

impl<C, R, E> ClassificationService<C, R, E>
where
    C: Classification,
    R: ClassificationRepository<C>,
    E: ElementRepository,
{
    fn not_found(id: C::Id) -> Error {
        Error::not_found(format!("{} {id} not found", C::KIND))
    }

    async fn load(&self, id: C::Id) -> Result<C, Error> {
        self.entries
            .find(id)
            .await
            .map_err(|err| map_catalogue_error(C::KIND, err))?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn ensure_unused(&self, id: C::Id) -> Result<(), Error> {
        if !C::GUARDS_ELEMENTS {
            return Ok(());
        }
        let count = self
            .elements
            .count(C::element_filter(id))
            .await
            .map_err(map_element_error)?;
        if count == 0 {
            return Ok(());
        }
        Err(
            Error::conflict(format!("{} still has elements", C::KIND)).with_details(json!({
                "code": "in_use",
                "elements": count,
            })),
        )
    }
}

#[async_trait]
impl<C, R, E> ClassificationCatalogue<C> for ClassificationService<C, R, E>
where
    C: Classification,
    R: ClassificationRepository<C>,
    E: ElementRepository,
{
    async fn list(&self, page: PageRequest) -> Result<Page<C>, Error> {
        self.entries
            .list(page)
            .await
            .map_err(|err| map_catalogue_error(C::KIND, err))
    }

    async fn get(&self, id: C::Id) -> Result<C, Error> {
        self.load(id).await
    }

    async fn create(&self, draft: C::Draft) -> Result<C, Error> {
        let entry = C::create(C::new_id(), draft, self.clock.utc());
        self.entries
            .insert(&entry)
            .await
            .map_err(|err| map_catalogue_error(C::KIND, err))?;
        info!(kind = C::KIND, id = %entry.id(), "catalogue entry created");
        Ok(entry)
    }

    async fn update(&self, id: C::Id, draft: C::Draft) -> Result<C, Error> {
        let mut entry = self.load(id).await?;
        entry.apply(draft, self.clock.utc());
        let updated = self
            .entries
            .update(&entry)
            .await
            .map_err(|err| map_catalogue_error(C::KIND, err))?;
        if updated {
            Ok(entry)
        } else {
            Err(Self::not_found(id))
        }
    }

    async fn delete(&self, id: C::Id) -> Result<(), Error> {
        self.ensure_unused(id).await?;
        let deleted = self
            .entries
            .delete(id)
            .await
            .map_err(|err| map_catalogue_error(C::KIND, err))?;
        if !deleted {
            return Err(Self::not_found(id));
        }
        info!(kind = C::KIND, %id, "catalogue entry deleted");
        Ok(())
    }

    async fn elements(&self, id: C::Id, page: PageRequest) -> Result<Page<Element>, Error> {
        self.load(id).await?;
        self.elements
            .list(C::element_filter(id), page)
            .await
            .map_err(map_element_error)
    }
}
