//! Driving ports for the reservation workflow.
//!
//! Inbound adapters authorise the caller first, then call these ports. The
//! ports enforce the state machine and stock invariants themselves.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Error, Page, PageRequest, Reservation, ReservationDraft, ReservationId, UserId};

/// Reservation together with the stock of its element after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LendingOutcome {
    /// Reservation after the transition.
    pub reservation: Reservation,
    /// Element stock after the transition.
    pub stock: u32,
}

/// Mutating reservation use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationCommand: Send + Sync {
    /// Open a reservation in status `new`. Stock is untouched.
    async fn create(&self, draft: ReservationDraft) -> Result<Reservation, Error>;

    /// Accept a `new` reservation. Takes one unit when available, otherwise
    /// records `out_of_stock`.
    async fn accept(&self, id: ReservationId) -> Result<LendingOutcome, Error>;

    /// Mark an `accepted` reservation returned and restore one unit.
    async fn return_reservation(&self, id: ReservationId) -> Result<LendingOutcome, Error>;

    /// Replace the requester comment.
    async fn update_comment(&self, id: ReservationId, comment: String)
    -> Result<Reservation, Error>;

    /// Remove a reservation record.
    async fn delete(&self, id: ReservationId) -> Result<(), Error>;
}

/// Read-only reservation use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationQuery: Send + Sync {
    /// Fetch one reservation.
    async fn get(&self, id: ReservationId) -> Result<Reservation, Error>;

    /// List every reservation.
    async fn list(&self, page: PageRequest) -> Result<Page<Reservation>, Error>;

    /// List reservations made by `user_id`.
    async fn list_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Reservation>, Error>;
}
