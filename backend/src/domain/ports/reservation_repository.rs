//! Port for reservation persistence and atomic lending transitions.
//!
//! [`ReservationRepository::commit_transition`] is the only way a status
//! change reaches storage. Adapters must apply the status compare-and-swap and
//! the stock change as one unit: either both land or neither does.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    ElementId, Page, PageRequest, Reservation, ReservationId, ReservationStatus, TransitionPlan,
    UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reservation repository adapters.
    pub enum ReservationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "reservation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "reservation repository query failed: {message}",
    }
}

/// A status change to commit together with its stock effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    /// Reservation being moved.
    pub reservation_id: ReservationId,
    /// Element whose stock the plan adjusts.
    pub element_id: ElementId,
    /// Status the caller observed; the commit fails if it changed since.
    pub from: ReservationStatus,
    /// Target status and stock effect.
    pub plan: TransitionPlan,
    /// Timestamp recorded as `updated_at`.
    pub at: DateTime<Utc>,
}

/// Outcome of [`ReservationRepository::commit_transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionCommit {
    /// Status and stock were both written.
    Applied {
        /// Reservation after the change.
        reservation: Reservation,
        /// Element stock after the change.
        stock: u32,
    },
    /// The plan takes a unit but none was left. Nothing was written.
    StockExhausted,
    /// Another writer moved the reservation first. Nothing was written.
    StatusChanged {
        /// Status found at commit time.
        actual: ReservationStatus,
    },
    /// The reservation or its element no longer exists.
    Missing,
}

/// Storage for reservations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Fetch one reservation.
    async fn find(
        &self,
        id: ReservationId,
    ) -> Result<Option<Reservation>, ReservationRepositoryError>;

    /// List all reservations, newest first.
    async fn list(
        &self,
        page: PageRequest,
    ) -> Result<Page<Reservation>, ReservationRepositoryError>;

    /// List reservations linked to `user_id`, newest first.
    async fn list_by_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Reservation>, ReservationRepositoryError>;

    /// Store a new reservation.
    async fn insert(&self, reservation: &Reservation) -> Result<(), ReservationRepositoryError>;

    /// Replace the comment. Returns the updated row, or `None` when missing.
    async fn update_comment(
        &self,
        id: ReservationId,
        comment: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Reservation>, ReservationRepositoryError>;

    /// Remove a reservation. Returns `false` when it does not exist.
    async fn delete(&self, id: ReservationId) -> Result<bool, ReservationRepositoryError>;

    /// Atomically move a reservation and adjust its element's stock.
    async fn commit_transition(
        &self,
        transition: &StatusTransition,
    ) -> Result<TransitionCommit, ReservationRepositoryError>;
}
