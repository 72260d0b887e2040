//! Driving ports for catalogue maintenance and browsing.

use async_trait::async_trait;

use crate::domain::{
    Classification, Element, ElementDraft, ElementFilter, ElementId, Error, Page, PageRequest,
};

/// Element use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ElementCatalogue: Send + Sync {
    /// List elements matching `filter`.
    async fn list(&self, filter: ElementFilter, page: PageRequest)
    -> Result<Page<Element>, Error>;

    /// Fetch one element.
    async fn get(&self, id: ElementId) -> Result<Element, Error>;

    /// Create an element after checking its category, tags, and authors exist.
    async fn create(&self, draft: ElementDraft) -> Result<Element, Error>;

    /// Replace an element's editable fields.
    async fn update(&self, id: ElementId, draft: ElementDraft) -> Result<Element, Error>;

    /// Remove an element with no reservations.
    async fn delete(&self, id: ElementId) -> Result<(), Error>;
}

/// Category, tag, and author use-cases.
#[async_trait]
pub trait ClassificationCatalogue<C: Classification>: Send + Sync {
    /// List entries.
    async fn list(&self, page: PageRequest) -> Result<Page<C>, Error>;

    /// Fetch one entry.
    async fn get(&self, id: C::Id) -> Result<C, Error>;

    /// Create an entry.
    async fn create(&self, draft: C::Draft) -> Result<C, Error>;

    /// Replace an entry's editable fields.
    async fn update(&self, id: C::Id, draft: C::Draft) -> Result<C, Error>;

    /// Remove an entry. Categories still holding elements are refused.
    async fn delete(&self, id: C::Id) -> Result<(), Error>;

    /// Elements classified under `id`.
    async fn elements(&self, id: C::Id, page: PageRequest) -> Result<Page<Element>, Error>;
}
