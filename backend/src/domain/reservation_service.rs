//! Reservation workflow service.
//!
//! Implements [`ReservationCommand`] and [`ReservationQuery`] over the
//! reservation and element repositories. Each transition is planned from the
//! observed status and stock, then committed atomically by the repository.
//! When a concurrent accept takes the last unit between planning and commit,
//! the accept is replanned as `out_of_stock`. A return that races another
//! transition is replanned once from the status the repository observed.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::ports::{
    ElementRepository, LendingOutcome, ReservationCommand, ReservationQuery,
    ReservationRepository, StatusTransition, TransitionCommit,
};
use super::repository_error_mapping::{map_element_error, map_reservation_error};
use super::{
    Element, ElementId, Error, InvalidTransition, LendingAction, Page, PageRequest, Reservation,
    ReservationDraft, ReservationId, ReservationStatus, TransitionPlan, UserId, validate_comment,
};

/// Reservation service implementing the workflow driving ports.
#[derive(Clone)]
pub struct ReservationService<R, E> {
    reservations: Arc<R>,
    elements: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<R, E> ReservationService<R, E> {
    /// Create a new service with the given repositories.
    ///
    /// `clock` stamps `created_at` on new reservations and `updated_at` on
    /// every transition or comment edit.
    ///
    /// # Examples
    /// ```
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use lending_backend::domain::ReservationService;
    /// # use lending_backend::outbound::memory::InMemoryStore;
    /// let store = Arc::new(InMemoryStore::new());
    /// let _service = ReservationService::new(
    ///     Arc::clone(&store),
    ///     store,
    ///     Arc::new(DefaultClock),
    /// );
    /// ```
    pub fn new(reservations: Arc<R>, elements: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reservations,
            elements,
            clock,
        }
    }
}

impl<R, E> ReservationService<R, E>
where
    R: ReservationRepository,
    E: ElementRepository,
{
    async fn load(&self, id: ReservationId) -> Result<Reservation, Error> {
        self.reservations
            .find(id)
            .await
            .map_err(map_reservation_error)?
            .ok_or_else(|| reservation_not_found(id))
    }

    async fn load_element(&self, id: ElementId) -> Result<Element, Error> {
        self.elements
            .find(id)
            .await
            .map_err(map_element_error)?
            .ok_or_else(|| element_not_found(id))
    }

    async fn commit(
        &self,
        reservation: &Reservation,
        plan: TransitionPlan,
    ) -> Result<TransitionCommit, Error> {
        let transition = StatusTransition {
            reservation_id: reservation.id,
            element_id: reservation.element_id,
            from: reservation.status,
            plan,
            at: self.clock.utc(),
        };
        self.reservations
            .commit_transition(&transition)
            .await
            .map_err(map_reservation_error)
    }

    fn settle(
        reservation: &Reservation,
        action: LendingAction,
        commit: TransitionCommit,
    ) -> Result<LendingOutcome, Error> {
        match commit {
            TransitionCommit::Applied { reservation, stock } => {
                info!(
                    reservation_id = %reservation.id,
                    element_id = %reservation.element_id,
                    status = %reservation.status,
                    stock,
                    "reservation transition committed"
                );
                Ok(LendingOutcome { reservation, stock })
            }
            TransitionCommit::StatusChanged { actual } => {
                warn!(
                    reservation_id = %reservation.id,
                    expected = %reservation.status,
                    %actual,
                    "reservation changed concurrently"
                );
                Err(InvalidTransition {
                    from: actual,
                    action,
                }
                .into())
            }
            TransitionCommit::Missing => Err(reservation_not_found(reservation.id)),
            TransitionCommit::StockExhausted => Err(Error::internal(
                "stock exhausted on a transition that does not take stock",
            )),
        }
    }
}

fn reservation_not_found(id: ReservationId) -> Error {
    Error::not_found(format!("reservation {id} not found"))
}

fn element_not_found(id: ElementId) -> Error {
    Error::not_found(format!("element {id} not found"))
}

#[async_trait]
impl<R, E> ReservationCommand for ReservationService<R, E>
where
    R: ReservationRepository,
    E: ElementRepository,
{
    async fn create(&self, draft: ReservationDraft) -> Result<Reservation, Error> {
        self.load_element(draft.element_id()).await?;
        let reservation = Reservation::open(ReservationId::random(), draft, self.clock.utc());
        self.reservations
            .insert(&reservation)
            .await
            .map_err(map_reservation_error)?;
        info!(
            reservation_id = %reservation.id,
            element_id = %reservation.element_id,
            "reservation opened"
        );
        Ok(reservation)
    }

    async fn accept(&self, id: ReservationId) -> Result<LendingOutcome, Error> {
        let reservation = self.load(id).await?;
        let element = self.load_element(reservation.element_id).await?;
        let plan = reservation.status.plan_accept(element.stock)?;

        let commit = match self.commit(&reservation, plan).await? {
            TransitionCommit::StockExhausted => {
                info!(
                    reservation_id = %reservation.id,
                    element_id = %reservation.element_id,
                    "last unit taken concurrently; recording out_of_stock"
                );
                self.commit(&reservation, ReservationStatus::out_of_stock_plan())
                    .await?
            }
            other => other,
        };
        Self::settle(&reservation, LendingAction::Accept, commit)
    }

    async fn return_reservation(&self, id: ReservationId) -> Result<LendingOutcome, Error> {
        let mut reservation = self.load(id).await?;
        let mut commit = self
            .commit(&reservation, reservation.status.plan_return())
            .await?;
        if let TransitionCommit::StatusChanged { actual } = commit {
            info!(
                reservation_id = %reservation.id,
                expected = %reservation.status,
                %actual,
                "reservation changed before return; replanning"
            );
            reservation.status = actual;
            commit = self.commit(&reservation, actual.plan_return()).await?;
        }
        Self::settle(&reservation, LendingAction::Return, commit)
    }

    async fn update_comment(
        &self,
        id: ReservationId,
        comment: String,
    ) -> Result<Reservation, Error> {
        let comment = validate_comment(&comment)?;
        self.reservations
            .update_comment(id, &comment, self.clock.utc())
            .await
            .map_err(map_reservation_error)?
            .ok_or_else(|| reservation_not_found(id))
    }

    async fn delete(&self, id: ReservationId) -> Result<(), Error> {
        let deleted = self
            .reservations
            .delete(id)
            .await
            .map_err(map_reservation_error)?;
        if deleted {
            info!(reservation_id = %id, "reservation deleted");
            Ok(())
        } else {
            Err(reservation_not_found(id))
        }
    }
}

#[async_trait]
impl<R, E> ReservationQuery for ReservationService<R, E>
where
    R: ReservationRepository,
    E: ElementRepository,
{
    async fn get(&self, id: ReservationId) -> Result<Reservation, Error> {
        self.load(id).await
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Reservation>, Error> {
        self.reservations
            .list(page)
            .await
            .map_err(map_reservation_error)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Reservation>, Error> {
        self.reservations
            .list_by_user(user_id, page)
            .await
            .map_err(map_reservation_error)
    }
}

#[cfg(test)]
#[path = "reservation_service_tests.rs"]
mod tests;
