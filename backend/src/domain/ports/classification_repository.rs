//! Port for category, tag, and author persistence.
//!
//! One generic trait serves all three kinds; adapters implement it once per
//! [`Classification`] type.

use async_trait::async_trait;

use crate::domain::{Classification, Page, PageRequest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by classification repository adapters.
    pub enum CatalogueRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "catalogue repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "catalogue repository query failed: {message}",
        /// Elements still reference the entry.
        InUse { message: String } =>
            "catalogue entry is still referenced: {message}",
    }
}

/// Storage for one classification kind.
#[async_trait]
pub trait ClassificationRepository<C: Classification>: Send + Sync {
    /// Fetch one entry.
    async fn find(&self, id: C::Id) -> Result<Option<C>, CatalogueRepositoryError>;

    /// First id in `ids` with no stored entry, if any.
    async fn first_missing(&self, ids: &[C::Id]) -> Result<Option<C::Id>, CatalogueRepositoryError>;

    /// List entries ordered by [`Classification::sort_key`].
    async fn list(&self, page: PageRequest) -> Result<Page<C>, CatalogueRepositoryError>;

    /// Store a new entry.
    async fn insert(&self, entry: &C) -> Result<(), CatalogueRepositoryError>;

    /// Replace an entry. Returns `false` when it does not exist.
    async fn update(&self, entry: &C) -> Result<bool, CatalogueRepositoryError>;

    /// Remove an entry. Returns `false` when it does not exist.
    async fn delete(&self, id: C::Id) -> Result<bool, CatalogueRepositoryError>;
}
