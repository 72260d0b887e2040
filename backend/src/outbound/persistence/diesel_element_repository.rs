//! PostgreSQL-backed `ElementRepository` implementation.
//!
//! Elements live in `elements`; tag and author membership in `element_tags`
//! and `element_authors`. Writes touch all three inside one transaction.
//! Deleting an element that reservations still reference trips the
//! `reservations.element_id` foreign key and surfaces as
//! [`ElementRepositoryError::InUse`].

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ElementRepository, ElementRepositoryError};
use crate::domain::{AuthorId, Element, ElementFilter, ElementId, Page, PageRequest, TagId};

use super::diesel_basic_error_mapping::{
    is_foreign_key_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_helpers::{page_limit, page_offset, row_total};
use super::models::{ElementRow, ElementUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{element_authors, element_tags, elements};

/// Diesel-backed implementation of the element repository port.
#[derive(Clone)]
pub struct DieselElementRepository {
    pool: DbPool,
}

impl DieselElementRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ElementRepositoryError {
    map_basic_pool_error(error, ElementRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ElementRepositoryError {
    map_basic_diesel_error(
        error,
        ElementRepositoryError::query,
        ElementRepositoryError::connection,
    )
}

/// Boxed `elements` query restricted by `filter`.
fn filtered(filter: ElementFilter) -> elements::BoxedQuery<'static, Pg> {
    let mut query = elements::table.into_boxed();
    if let Some(category_id) = filter.category_id {
        query = query.filter(elements::category_id.eq(*category_id.as_uuid()));
    }
    if let Some(tag_id) = filter.tag_id {
        query = query.filter(
            elements::id.eq_any(
                element_tags::table
                    .filter(element_tags::tag_id.eq(*tag_id.as_uuid()))
                    .select(element_tags::element_id),
            ),
        );
    }
    if let Some(author_id) = filter.author_id {
        query = query.filter(
            elements::id.eq_any(
                element_authors::table
                    .filter(element_authors::author_id.eq(*author_id.as_uuid()))
                    .select(element_authors::element_id),
            ),
        );
    }
    query
}

/// Tag and author ids for each element in `ids`.
#[derive(Default)]
struct Links {
    tags: HashMap<Uuid, Vec<TagId>>,
    authors: HashMap<Uuid, Vec<AuthorId>>,
}

impl Links {
    async fn load(
        conn: &mut AsyncPgConnection,
        ids: &[Uuid],
    ) -> Result<Self, diesel::result::Error> {
        let mut links = Self::default();
        if ids.is_empty() {
            return Ok(links);
        }
        let tag_rows: Vec<(Uuid, Uuid)> = element_tags::table
            .filter(element_tags::element_id.eq_any(ids))
            .select((element_tags::element_id, element_tags::tag_id))
            .order_by((element_tags::element_id, element_tags::tag_id))
            .load(conn)
            .await?;
        for (element_id, tag_id) in tag_rows {
            links
                .tags
                .entry(element_id)
                .or_default()
                .push(TagId::from_uuid(tag_id));
        }
        let author_rows: Vec<(Uuid, Uuid)> = element_authors::table
            .filter(element_authors::element_id.eq_any(ids))
            .select((element_authors::element_id, element_authors::author_id))
            .order_by((element_authors::element_id, element_authors::author_id))
            .load(conn)
            .await?;
        for (element_id, author_id) in author_rows {
            links
                .authors
                .entry(element_id)
                .or_default()
                .push(AuthorId::from_uuid(author_id));
        }
        Ok(links)
    }

    fn attach(&mut self, row: ElementRow) -> Result<Element, ElementRepositoryError> {
        let tags = self.tags.remove(&row.id).unwrap_or_default();
        let authors = self.authors.remove(&row.id).unwrap_or_default();
        row.into_element(tags, authors)
            .map_err(ElementRepositoryError::query)
    }
}

/// Replace the link rows of `element`.
async fn write_links(
    conn: &mut AsyncPgConnection,
    element: &Element,
) -> Result<(), diesel::result::Error> {
    let id = *element.id.as_uuid();
    diesel::delete(element_tags::table.filter(element_tags::element_id.eq(id)))
        .execute(conn)
        .await?;
    diesel::delete(element_authors::table.filter(element_authors::element_id.eq(id)))
        .execute(conn)
        .await?;
    if !element.tag_ids.is_empty() {
        let rows: Vec<_> = element
            .tag_ids
            .iter()
            .map(|tag_id| {
                (
                    element_tags::element_id.eq(id),
                    element_tags::tag_id.eq(*tag_id.as_uuid()),
                )
            })
            .collect();
        diesel::insert_into(element_tags::table)
            .values(&rows)
            .execute(conn)
            .await?;
    }
    if !element.author_ids.is_empty() {
        let rows: Vec<_> = element
            .author_ids
            .iter()
            .map(|author_id| {
                (
                    element_authors::element_id.eq(id),
                    element_authors::author_id.eq(*author_id.as_uuid()),
                )
            })
            .collect();
        diesel::insert_into(element_authors::table)
            .values(&rows)
            .execute(conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl ElementRepository for DieselElementRepository {
    async fn find(&self, id: ElementId) -> Result<Option<Element>, ElementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ElementRow> = elements::table
            .find(*id.as_uuid())
            .select(ElementRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut links = Links::load(&mut conn, &[row.id])
            .await
            .map_err(map_diesel_error)?;
        links.attach(row).map(Some)
    }

    async fn list(
        &self,
        filter: ElementFilter,
        page: PageRequest,
    ) -> Result<Page<Element>, ElementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ElementRow> = filtered(filter)
            .select(ElementRow::as_select())
            .order_by((elements::title, elements::id))
            .limit(page_limit(page))
            .offset(page_offset(page))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut links = Links::load(&mut conn, &ids)
            .await
            .map_err(map_diesel_error)?;
        let items = rows
            .into_iter()
            .map(|row| links.attach(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, row_total(total)))
    }

    async fn count(&self, filter: ElementFilter) -> Result<u64, ElementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map(row_total)
            .map_err(map_diesel_error)
    }

    async fn insert(&self, element: &Element) -> Result<(), ElementRepositoryError> {
        let row = ElementRow::from_element(element).map_err(ElementRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(elements::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                write_links(conn, element).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn update(&self, element: &Element) -> Result<bool, ElementRepositoryError> {
        let changes =
            ElementUpdate::from_element(element).map_err(ElementRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let affected = diesel::update(elements::table.find(*element.id.as_uuid()))
                    .set(&changes)
                    .execute(conn)
                    .await?;
                if affected == 0 {
                    return Ok(false);
                }
                write_links(conn, element).await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(&self, id: ElementId) -> Result<bool, ElementRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(elements::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|affected| affected > 0)
            .map_err(|error| {
                if is_foreign_key_violation(&error) {
                    ElementRepositoryError::in_use("element has reservations")
                } else {
                    map_diesel_error(error)
                }
            })
    }
}
