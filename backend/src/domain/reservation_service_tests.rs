//! Tests for the reservation workflow service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockElementRepository, MockReservationRepository};
use crate::domain::{
    CategoryId, ElementDraft, ElementInput, ErrorCode, Requester, StockChange,
};
use crate::test_support::{FixedClock, fixture_timestamp};
use chrono::{Duration, Utc};
use rstest::{fixture, rstest};

fn element_with_stock(stock: u32) -> Element {
    let draft = ElementDraft::new(ElementInput {
        title: "Solaris",
        description: "Ocean planet novel",
        stock,
        category_id: Some(CategoryId::random()),
        ..ElementInput::default()
    })
    .expect("valid element");
    Element::create(ElementId::random(), draft, Utc::now())
}

fn reservation_for(element: &Element, status: ReservationStatus) -> Reservation {
    let requester = Requester::new("reader@example.org", "reader", Some(UserId::random()))
        .expect("valid requester");
    let draft =
        ReservationDraft::new(element.id, requester, "for the reading group").expect("draft");
    let mut reservation = Reservation::open(ReservationId::random(), draft, Utc::now());
    reservation.status = status;
    reservation
}

fn applied(transition: &StatusTransition, base: &Reservation, stock: u32) -> TransitionCommit {
    let mut reservation = base.clone();
    reservation.status = transition.plan.to;
    reservation.updated_at = transition.at;
    TransitionCommit::Applied { reservation, stock }
}

fn make_service(
    reservations: MockReservationRepository,
    elements: MockElementRepository,
) -> ReservationService<MockReservationRepository, MockElementRepository> {
    make_service_with_clock(reservations, elements, FixedClock::at_fixture_time())
}

fn make_service_with_clock(
    reservations: MockReservationRepository,
    elements: MockElementRepository,
    clock: FixedClock,
) -> ReservationService<MockReservationRepository, MockElementRepository> {
    ReservationService::new(Arc::new(reservations), Arc::new(elements), Arc::new(clock))
}

fn elements_returning(element: Element) -> MockElementRepository {
    let mut elements = MockElementRepository::new();
    elements
        .expect_find()
        .returning(move |_| Ok(Some(element.clone())));
    elements
}

#[fixture]
fn stocked() -> Element {
    element_with_stock(2)
}

#[rstest]
#[tokio::test]
async fn accept_takes_one_unit_when_stock_remains(stocked: Element) {
    let reservation = reservation_for(&stocked, ReservationStatus::New);
    let mut reservations = MockReservationRepository::new();
    let found = reservation.clone();
    reservations
        .expect_find()
        .return_once(move |_| Ok(Some(found)));
    let base = reservation.clone();
    reservations
        .expect_commit_transition()
        .withf(|t| {
            t.from == ReservationStatus::New
                && t.plan.to == ReservationStatus::Accepted
                && t.plan.stock == StockChange::Take
        })
        .times(1)
        .returning(move |t| Ok(applied(t, &base, 1)));

    let service = make_service(reservations, elements_returning(stocked));
    let outcome = service.accept(reservation.id).await.expect("accept succeeds");

    assert_eq!(outcome.reservation.status, ReservationStatus::Accepted);
    assert_eq!(outcome.stock, 1);
}

#[rstest]
#[tokio::test]
async fn accept_with_no_stock_records_out_of_stock() {
    let empty = element_with_stock(0);
    let reservation = reservation_for(&empty, ReservationStatus::New);
    let mut reservations = MockReservationRepository::new();
    let found = reservation.clone();
    reservations
        .expect_find()
        .return_once(move |_| Ok(Some(found)));
    let base = reservation.clone();
    reservations
        .expect_commit_transition()
        .withf(|t| t.plan == ReservationStatus::out_of_stock_plan())
        .times(1)
        .returning(move |t| Ok(applied(t, &base, 0)));

    let service = make_service(reservations, elements_returning(empty));
    let outcome = service.accept(reservation.id).await.expect("accept records");

    assert_eq!(outcome.reservation.status, ReservationStatus::OutOfStock);
    assert_eq!(outcome.stock, 0);
}

#[rstest]
#[tokio::test]
async fn accept_replans_when_the_last_unit_is_taken_concurrently() {
    let last_unit = element_with_stock(1);
    let reservation = reservation_for(&last_unit, ReservationStatus::New);
    let mut reservations = MockReservationRepository::new();
    let found = reservation.clone();
    reservations
        .expect_find()
        .return_once(move |_| Ok(Some(found)));
    let base = reservation.clone();
    reservations
        .expect_commit_transition()
        .times(2)
        .returning(move |t| match t.plan.stock {
            StockChange::Take => Ok(TransitionCommit::StockExhausted),
            _ => Ok(applied(t, &base, 0)),
        });

    let service = make_service(reservations, elements_returning(last_unit));
    let outcome = service.accept(reservation.id).await.expect("fallback applies");

    assert_eq!(outcome.reservation.status, ReservationStatus::OutOfStock);
}

#[rstest]
#[case(ReservationStatus::Accepted)]
#[case(ReservationStatus::OutOfStock)]
#[case(ReservationStatus::Returned)]
#[tokio::test]
async fn accept_refuses_anything_but_new(stocked: Element, #[case] status: ReservationStatus) {
    let reservation = reservation_for(&stocked, status);
    let mut reservations = MockReservationRepository::new();
    let found = reservation.clone();
    reservations
        .expect_find()
        .return_once(move |_| Ok(Some(found)));
    reservations.expect_commit_transition().times(0);

    let service = make_service(reservations, elements_returning(stocked));
    let error = service.accept(reservation.id).await.expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    let details = error.details().expect("details");
    assert_eq!(details["code"], "invalid_transition");
}

#[rstest]
#[tokio::test]
async fn concurrent_status_change_is_a_conflict(stocked: Element) {
    let reservation = reservation_for(&stocked, ReservationStatus::New);
    let mut reservations = MockReservationRepository::new();
    let found = reservation.clone();
    reservations
        .expect_find()
        .return_once(move |_| Ok(Some(found)));
    reservations
        .expect_commit_transition()
        .times(1)
        .returning(|_| {
            Ok(TransitionCommit::StatusChanged {
                actual: ReservationStatus::Accepted,
            })
        });

    let service = make_service(reservations, elements_returning(stocked));
    let error = service.accept(reservation.id).await.expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.message(),
        "cannot accept a reservation that is accepted"
    );
}

#[rstest]
#[case(ReservationStatus::New)]
#[case(ReservationStatus::Accepted)]
#[case(ReservationStatus::OutOfStock)]
#[case(ReservationStatus::Returned)]
#[tokio::test]
async fn return_restores_stock_from_any_status(
    stocked: Element,
    #[case] status: ReservationStatus,
) {
    let reservation = reservation_for(&stocked, status);
    let mut reservations = MockReservationRepository::new();
    let found = reservation.clone();
    reservations
        .expect_find()
        .return_once(move |_| Ok(Some(found)));
    let base = reservation.clone();
    reservations
        .expect_commit_transition()
        .withf(move |t| {
            t.from == status
                && t.plan.to == ReservationStatus::Returned
                && t.plan.stock == StockChange::Restore
        })
        .times(1)
        .returning(move |t| Ok(applied(t, &base, 3)));

    let service = make_service(reservations, MockElementRepository::new());
    let outcome = service
        .return_reservation(reservation.id)
        .await
        .expect("return succeeds");

    assert_eq!(outcome.reservation.status, ReservationStatus::Returned);
    assert_eq!(outcome.stock, 3);
}

#[rstest]
#[tokio::test]
async fn return_replans_from_a_concurrent_status(stocked: Element) {
    let reservation = reservation_for(&stocked, ReservationStatus::New);
    let mut reservations = MockReservationRepository::new();
    let found = reservation.clone();
    reservations
        .expect_find()
        .return_once(move |_| Ok(Some(found)));
    let base = reservation.clone();
    reservations
        .expect_commit_transition()
        .times(2)
        .returning(move |t| match t.from {
            ReservationStatus::New => Ok(TransitionCommit::StatusChanged {
                actual: ReservationStatus::Accepted,
            }),
            _ => Ok(applied(t, &base, 2)),
        });

    let service = make_service(reservations, MockElementRepository::new());
    let outcome = service
        .return_reservation(reservation.id)
        .await
        .expect("replanned return");

    assert_eq!(outcome.reservation.status, ReservationStatus::Returned);
    assert_eq!(outcome.stock, 2);
}

#[rstest]
#[tokio::test]
async fn transitions_are_stamped_by_the_clock(stocked: Element) {
    let clock = FixedClock::at_fixture_time();
    let reservation = reservation_for(&stocked, ReservationStatus::New);
    let mut reservations = MockReservationRepository::new();
    let found = reservation.clone();
    reservations
        .expect_find()
        .return_once(move |_| Ok(Some(found)));
    let expected_at = fixture_timestamp() + Duration::minutes(30);
    let base = reservation.clone();
    reservations
        .expect_commit_transition()
        .withf(move |t| t.at == expected_at)
        .times(1)
        .returning(move |t| Ok(applied(t, &base, 1)));

    let service =
        make_service_with_clock(reservations, elements_returning(stocked), clock.clone());
    clock.advance(Duration::minutes(30));
    let outcome = service.accept(reservation.id).await.expect("accept succeeds");

    assert_eq!(outcome.reservation.updated_at, expected_at);
}

#[rstest]
#[tokio::test]
async fn create_requires_an_existing_element(stocked: Element) {
    let reservation = reservation_for(&stocked, ReservationStatus::New);
    let mut elements = MockElementRepository::new();
    elements.expect_find().return_once(|_| Ok(None));
    let mut reservations = MockReservationRepository::new();
    reservations.expect_insert().times(0);

    let service = make_service(reservations, elements);
    let draft = ReservationDraft::new(
        reservation.element_id,
        reservation.requester.clone(),
        "please",
    )
    .expect("draft");
    let error = service.create(draft).await.expect_err("missing element");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn create_leaves_stock_alone(stocked: Element) {
    let reservation = reservation_for(&stocked, ReservationStatus::New);
    let mut reservations = MockReservationRepository::new();
    reservations.expect_insert().times(1).returning(|_| Ok(()));
    reservations.expect_commit_transition().times(0);

    let service = make_service(reservations, elements_returning(stocked));
    let draft = ReservationDraft::new(
        reservation.element_id,
        reservation.requester.clone(),
        "please",
    )
    .expect("draft");
    let created = service.create(draft).await.expect("create succeeds");

    assert_eq!(created.status, ReservationStatus::New);
    assert_eq!(created.comment, "please");
    assert_eq!(created.created_at, fixture_timestamp());
    assert_eq!(created.updated_at, fixture_timestamp());
}

#[rstest]
#[tokio::test]
async fn update_comment_stamps_updated_at() {
    let mut reservations = MockReservationRepository::new();
    reservations
        .expect_update_comment()
        .withf(|_, comment, at| {
            comment.to_string() == "back on Friday" && *at == fixture_timestamp()
        })
        .times(1)
        .returning(|_, _, _| Ok(None));

    let service = make_service(reservations, MockElementRepository::new());
    let error = service
        .update_comment(ReservationId::random(), "back on Friday".to_owned())
        .await
        .expect_err("missing reservation");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_comment_rejects_blank_text() {
    let mut reservations = MockReservationRepository::new();
    reservations.expect_update_comment().times(0);

    let service = make_service(reservations, MockElementRepository::new());
    let error = service
        .update_comment(ReservationId::random(), "   ".to_owned())
        .await
        .expect_err("invalid comment");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn delete_missing_reservation_is_not_found() {
    let mut reservations = MockReservationRepository::new();
    reservations.expect_delete().return_once(|_| Ok(false));

    let service = make_service(reservations, MockElementRepository::new());
    let error = service
        .delete(ReservationId::random())
        .await
        .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
}
