//! PostgreSQL-backed `ReservationRepository` implementation.
//!
//! `commit_transition` runs in one transaction:
//!
//! 1. lock the reservation row (`SELECT … FOR UPDATE`) and compare its
//!    status with the expected one;
//! 2. adjust stock with a conditional update
//!    (`UPDATE elements SET stock = stock - 1 WHERE id = $1 AND stock > 0`);
//! 3. write the new status.
//!
//! Two administrators accepting the last unit at once therefore see exactly
//! one `Applied` and one `StockExhausted`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    ReservationRepository, ReservationRepositoryError, StatusTransition, TransitionCommit,
};
use crate::domain::{
    Page, PageRequest, Reservation, ReservationId, ReservationStatus, StockChange, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_helpers::{page_limit, page_offset, row_total};
use super::models::{ReservationRow, stock_from_row};
use super::pool::{DbPool, PoolError};
use super::schema::{elements, reservations};

/// Diesel-backed implementation of the reservation repository port.
#[derive(Clone)]
pub struct DieselReservationRepository {
    pool: DbPool,
}

impl DieselReservationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReservationRepositoryError {
    map_basic_pool_error(error, ReservationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReservationRepositoryError {
    map_basic_diesel_error(
        error,
        ReservationRepositoryError::query,
        ReservationRepositoryError::connection,
    )
}

fn row_to_reservation(row: ReservationRow) -> Result<Reservation, ReservationRepositoryError> {
    Reservation::try_from(row).map_err(ReservationRepositoryError::query)
}

fn rows_to_page(
    rows: Vec<ReservationRow>,
    page: PageRequest,
    total: i64,
) -> Result<Page<Reservation>, ReservationRepositoryError> {
    let items = rows
        .into_iter()
        .map(row_to_reservation)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Page::new(items, page, row_total(total)))
}

/// Transaction outcome before rows are converted to domain values.
enum RowCommit {
    Applied { row: ReservationRow, stock: i32 },
    StockExhausted,
    StatusChanged { actual: String },
    Missing,
}

/// Apply `change` to the element's stock, returning the new value, or
/// `None` when the element is gone or a take would go below zero.
async fn adjust_stock(
    conn: &mut AsyncPgConnection,
    element_id: Uuid,
    change: StockChange,
) -> Result<Option<i32>, diesel::result::Error> {
    let target = elements::table.find(element_id);
    match change {
        StockChange::Take => {
            diesel::update(target.filter(elements::stock.gt(0)))
                .set(elements::stock.eq(elements::stock - 1))
                .returning(elements::stock)
                .get_result(conn)
                .await
                .optional()
        }
        StockChange::Restore => {
            diesel::update(target)
                .set(elements::stock.eq(elements::stock + 1))
                .returning(elements::stock)
                .get_result(conn)
                .await
                .optional()
        }
        StockChange::Keep => {
            target
                .select(elements::stock)
                .first(conn)
                .await
                .optional()
        }
    }
}

async fn element_exists(
    conn: &mut AsyncPgConnection,
    element_id: Uuid,
) -> Result<bool, diesel::result::Error> {
    diesel::select(diesel::dsl::exists(elements::table.find(element_id)))
        .get_result(conn)
        .await
}

async fn commit_rows(
    conn: &mut AsyncPgConnection,
    transition: StatusTransition,
) -> Result<RowCommit, diesel::result::Error> {
    let reservation_id = *transition.reservation_id.as_uuid();
    let element_id = *transition.element_id.as_uuid();
    let expected = transition.from.as_str();

    let current: Option<String> = reservations::table
        .find(reservation_id)
        .select(reservations::status)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let Some(current) = current else {
        return Ok(RowCommit::Missing);
    };
    if current != expected {
        return Ok(RowCommit::StatusChanged { actual: current });
    }

    let Some(stock) = adjust_stock(conn, element_id, transition.plan.stock).await? else {
        if element_exists(conn, element_id).await? {
            return Ok(RowCommit::StockExhausted);
        }
        return Ok(RowCommit::Missing);
    };

    let row = diesel::update(
        reservations::table
            .find(reservation_id)
            .filter(reservations::status.eq(expected)),
    )
    .set((
        reservations::status.eq(transition.plan.to.as_str()),
        reservations::updated_at.eq(transition.at),
    ))
    .returning(ReservationRow::as_returning())
    .get_result(conn)
    .await?;
    Ok(RowCommit::Applied { row, stock })
}

impl RowCommit {
    fn into_commit(self) -> Result<TransitionCommit, ReservationRepositoryError> {
        match self {
            Self::Applied { row, stock } => Ok(TransitionCommit::Applied {
                reservation: row_to_reservation(row)?,
                stock: stock_from_row(stock).map_err(ReservationRepositoryError::query)?,
            }),
            Self::StockExhausted => Ok(TransitionCommit::StockExhausted),
            Self::StatusChanged { actual } => {
                let actual = actual.parse::<ReservationStatus>().map_err(|_| {
                    ReservationRepositoryError::query(format!(
                        "unknown reservation status '{actual}' in storage"
                    ))
                })?;
                Ok(TransitionCommit::StatusChanged { actual })
            }
            Self::Missing => Ok(TransitionCommit::Missing),
        }
    }
}

#[async_trait]
impl ReservationRepository for DieselReservationRepository {
    async fn find(
        &self,
        id: ReservationId,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = reservations::table
            .find(*id.as_uuid())
            .select(ReservationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_reservation).transpose()
    }

    async fn list(
        &self,
        page: PageRequest,
    ) -> Result<Page<Reservation>, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = reservations::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ReservationRow> = reservations::table
            .select(ReservationRow::as_select())
            .order_by((reservations::created_at.desc(), reservations::id))
            .limit(page_limit(page))
            .offset(page_offset(page))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_page(rows, page, total)
    }

    async fn list_by_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Reservation>, ReservationRepositoryError> {
        let owner = *user_id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = reservations::table
            .filter(reservations::user_id.eq(owner))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ReservationRow> = reservations::table
            .filter(reservations::user_id.eq(owner))
            .select(ReservationRow::as_select())
            .order_by((reservations::created_at.desc(), reservations::id))
            .limit(page_limit(page))
            .offset(page_offset(page))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_page(rows, page, total)
    }

    async fn insert(&self, reservation: &Reservation) -> Result<(), ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(reservations::table)
            .values(ReservationRow::from(reservation))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_comment(
        &self,
        id: ReservationId,
        comment: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(reservations::table.find(*id.as_uuid()))
            .set((
                reservations::comment.eq(comment),
                reservations::updated_at.eq(at),
            ))
            .returning(ReservationRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_reservation).transpose()
    }

    async fn delete(&self, id: ReservationId) -> Result<bool, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(reservations::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|affected| affected > 0)
            .map_err(map_diesel_error)
    }

    async fn commit_transition(
        &self,
        transition: &StatusTransition,
    ) -> Result<TransitionCommit, ReservationRepositoryError> {
        let transition = *transition;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| async move { commit_rows(conn, transition).await }.scope_boxed())
            .await
            .map_err(map_diesel_error)?
            .into_commit()
    }
}
