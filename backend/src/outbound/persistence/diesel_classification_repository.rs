//! PostgreSQL-backed category, tag, and author repositories.
//!
//! The three tables share one shape, so a single adapter implements
//! [`ClassificationRepository`] for each entity through
//! `impl_classification_repository!`. Deleting a category that elements still
//! reference trips the `elements.category_id` foreign key and surfaces as
//! [`CatalogueRepositoryError::InUse`]; tag and author links cascade.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CatalogueRepositoryError, ClassificationRepository};
use crate::domain::{Author, AuthorId, Category, CategoryId, Page, PageRequest, Tag, TagId};

use super::diesel_basic_error_mapping::{
    is_foreign_key_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_helpers::{page_limit, page_offset, row_total};
use super::models::{AuthorRow, AuthorUpdate, CategoryRow, CategoryUpdate, TagRow, TagUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{authors, categories, tags};

/// Diesel-backed classification repository.
#[derive(Clone)]
pub struct DieselClassificationRepository {
    pool: DbPool,
}

impl DieselClassificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CatalogueRepositoryError {
    map_basic_pool_error(error, CatalogueRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CatalogueRepositoryError {
    map_basic_diesel_error(
        error,
        CatalogueRepositoryError::query,
        CatalogueRepositoryError::connection,
    )
}

fn map_delete_error(error: diesel::result::Error, kind: &str) -> CatalogueRepositoryError {
    if is_foreign_key_violation(&error) {
        return CatalogueRepositoryError::in_use(format!("{kind} still has elements"));
    }
    map_diesel_error(error)
}

/// First id in `wanted` absent from `found`, keeping caller order.
fn first_absent<I: Copy>(wanted: &[I], found: &[Uuid], uuid: impl Fn(&I) -> Uuid) -> Option<I> {
    wanted.iter().copied().find(|id| !found.contains(&uuid(id)))
}

macro_rules! impl_classification_repository {
    (
        $entity:ty,
        id = $id:ty,
        kind = $kind:literal,
        table = $table:ident,
        row = $row:ty,
        update = $update:ty,
        order = ($($order:expr),+ $(,)?)
    ) => {
        #[async_trait]
        impl ClassificationRepository<$entity> for DieselClassificationRepository {
            async fn find(&self, id: $id) -> Result<Option<$entity>, CatalogueRepositoryError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                $table::table
                    .find(*id.as_uuid())
                    .select(<$row>::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map(|row| row.map(<$entity>::from))
                    .map_err(map_diesel_error)
            }

            async fn first_missing(
                &self,
                ids: &[$id],
            ) -> Result<Option<$id>, CatalogueRepositoryError> {
                if ids.is_empty() {
                    return Ok(None);
                }
                let wanted: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let found: Vec<Uuid> = $table::table
                    .filter($table::id.eq_any(&wanted))
                    .select($table::id)
                    .load(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                Ok(first_absent(ids, &found, |id| *id.as_uuid()))
            }

            async fn list(
                &self,
                page: PageRequest,
            ) -> Result<Page<$entity>, CatalogueRepositoryError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let total: i64 = $table::table
                    .count()
                    .get_result(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                let rows: Vec<$row> = $table::table
                    .select(<$row>::as_select())
                    .order_by(($($order),+))
                    .limit(page_limit(page))
                    .offset(page_offset(page))
                    .load(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                let items = rows.into_iter().map(<$entity>::from).collect();
                Ok(Page::new(items, page, row_total(total)))
            }

            async fn insert(&self, entry: &$entity) -> Result<(), CatalogueRepositoryError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::insert_into($table::table)
                    .values(<$row>::from(entry))
                    .execute(&mut conn)
                    .await
                    .map(|_| ())
                    .map_err(map_diesel_error)
            }

            async fn update(&self, entry: &$entity) -> Result<bool, CatalogueRepositoryError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::update($table::table.find(*entry.id.as_uuid()))
                    .set(<$update>::from(entry))
                    .execute(&mut conn)
                    .await
                    .map(|affected| affected > 0)
                    .map_err(map_diesel_error)
            }

            async fn delete(&self, id: $id) -> Result<bool, CatalogueRepositoryError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                diesel::delete($table::table.find(*id.as_uuid()))
                    .execute(&mut conn)
                    .await
                    .map(|affected| affected > 0)
                    .map_err(|error| map_delete_error(error, $kind))
            }
        }
    };
}

impl_classification_repository!(
    Category,
    id = CategoryId,
    kind = "category",
    table = categories,
    row = CategoryRow,
    update = CategoryUpdate<'_>,
    order = (categories::title, categories::id)
);

impl_classification_repository!(
    Tag,
    id = TagId,
    kind = "tag",
    table = tags,
    row = TagRow,
    update = TagUpdate<'_>,
    order = (tags::title, tags::id)
);

impl_classification_repository!(
    Author,
    id = AuthorId,
    kind = "author",
    table = authors,
    row = AuthorRow,
    update = AuthorUpdate<'_>,
    order = (authors::surname, authors::name, authors::id)
);
