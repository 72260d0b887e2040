//! Port for element persistence.
//!
//! Adapters store elements together with their tag and author links. Stock is
//! written here only through [`ElementRepository::insert`] and
//! [`ElementRepository::update`]; lending changes go through
//! [`super::ReservationRepository::commit_transition`] so they stay atomic
//! with the reservation status.

use async_trait::async_trait;

use crate::domain::{Element, ElementFilter, ElementId, Page, PageRequest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by element repository adapters.
    pub enum ElementRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "element repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "element repository query failed: {message}",
        /// Reservations still reference the element.
        InUse { message: String } =>
            "element is still referenced: {message}",
    }
}

/// Storage for catalogue elements.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ElementRepository: Send + Sync {
    /// Fetch one element.
    async fn find(&self, id: ElementId) -> Result<Option<Element>, ElementRepositoryError>;

    /// List elements matching `filter`, ordered by title.
    async fn list(
        &self,
        filter: ElementFilter,
        page: PageRequest,
    ) -> Result<Page<Element>, ElementRepositoryError>;

    /// Count elements matching `filter`.
    async fn count(&self, filter: ElementFilter) -> Result<u64, ElementRepositoryError>;

    /// Store a new element with its links.
    async fn insert(&self, element: &Element) -> Result<(), ElementRepositoryError>;

    /// Replace an element and its links. Returns `false` when it does not exist.
    async fn update(&self, element: &Element) -> Result<bool, ElementRepositoryError>;

    /// Remove an element. Returns `false` when it does not exist.
    ///
    /// Fails with [`ElementRepositoryError::InUse`] while reservations refer
    /// to it.
    async fn delete(&self, id: ElementId) -> Result<bool, ElementRepositoryError>;
}
