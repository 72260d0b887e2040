//! Behaviour tests for the reservation workflow.
//!
//! Scenarios run the domain services over the in-memory store and check that
//! element stock follows each reservation's status, including when two
//! administrators race for the last unit.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

use std::cell::RefCell;
use std::sync::Arc;

use lending_backend::domain::ports::{FixtureLoginService, LendingOutcome, RepositoryBundle};
use lending_backend::domain::{
    Action, Actor, CategoryDraft, ElementDraft, ElementId, ElementInput, Error, Reservation,
    ReservationDraft, ReservationId, ResourceKind, Requester, Role, UserId, authorize,
};
use lending_backend::inbound::http::state::{HttpState, ServiceAdapters};
use lending_backend::outbound::memory::InMemoryStore;
use lending_backend::outbound::password::Argon2PasswordHasher;
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

const LABELS: [&str; 3] = ["A", "B", "C"];

struct ReservationWorld {
    runtime: Runtime,
    state: HttpState,
    element: RefCell<Option<ElementId>>,
    reservations: RefCell<Vec<ReservationId>>,
    last_error: RefCell<Option<Error>>,
    reader: RefCell<Option<Actor>>,
}

impl ReservationWorld {
    fn new() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test runtime");
        let state = HttpState::from_repositories(
            RepositoryBundle::shared(Arc::new(InMemoryStore::new())),
            ServiceAdapters {
                authenticator: Arc::new(FixtureLoginService),
                hasher: Arc::new(Argon2PasswordHasher::default()),
                clock: Arc::new(DefaultClock),
            },
        );
        Self {
            runtime,
            state,
            element: RefCell::new(None),
            reservations: RefCell::new(Vec::new()),
            last_error: RefCell::new(None),
            reader: RefCell::new(None),
        }
    }

    fn element_id(&self) -> ElementId {
        self.element.borrow().expect("element created")
    }

    fn first_reservation(&self) -> ReservationId {
        *self
            .reservations
            .borrow()
            .first()
            .expect("reservation created")
    }

    fn open_reservation(&self) {
        let requester =
            Requester::new("reader@example.org", "Grace", None).expect("valid requester");
        let draft = ReservationDraft::new(self.element_id(), requester, "Weekend reading")
            .expect("valid draft");
        let reservation = self
            .runtime
            .block_on(self.state.reservations.create(draft))
            .expect("reservation created");
        self.reservations.borrow_mut().push(reservation.id);
    }

    fn labelled(&self, label: &str) -> ReservationId {
        let index = LABELS
            .iter()
            .position(|known| *known == label)
            .unwrap_or_else(|| panic!("unknown reservation label {label}"));
        *self
            .reservations
            .borrow()
            .get(index)
            .unwrap_or_else(|| panic!("reservation {label} not created"))
    }

    fn record(&self, result: Result<LendingOutcome, Error>) {
        *self.last_error.borrow_mut() = result.err();
    }

    fn reservation(&self, id: ReservationId) -> Reservation {
        self.runtime
            .block_on(self.state.reservations_query.get(id))
            .expect("reservation exists")
    }
}

#[fixture]
fn world() -> ReservationWorld {
    ReservationWorld::new()
}

#[given("an element with stock {stock}")]
fn an_element_with_stock(world: &ReservationWorld, stock: u32) {
    let category = world
        .runtime
        .block_on(
            world
                .state
                .categories
                .create(CategoryDraft::new("Novels").expect("valid category")),
        )
        .expect("category created");
    let draft = ElementDraft::new(ElementInput {
        title: "Solaris",
        description: "A planet-wide ocean",
        stock,
        category_id: Some(category.id),
        ..ElementInput::default()
    })
    .expect("valid element");
    let element = world
        .runtime
        .block_on(world.state.elements.create(draft))
        .expect("element created");
    *world.element.borrow_mut() = Some(element.id);
}

#[given("a reservation for the element")]
fn a_reservation_for_the_element(world: &ReservationWorld) {
    world.open_reservation();
}

#[given("two reservations for the element")]
fn two_reservations_for_the_element(world: &ReservationWorld) {
    world.open_reservation();
    world.open_reservation();
}

#[given("reservations A, B and C for the element")]
fn reservations_a_b_and_c_for_the_element(world: &ReservationWorld) {
    for _ in LABELS {
        world.open_reservation();
    }
}

#[given("a reader account")]
fn a_reader_account(world: &ReservationWorld) {
    *world.reader.borrow_mut() = Some(Actor::authenticated(UserId::random(), [Role::User]));
}

#[when("an administrator accepts the reservation")]
fn an_administrator_accepts_the_reservation(world: &ReservationWorld) {
    let id = world.first_reservation();
    let result = world.runtime.block_on(world.state.reservations.accept(id));
    world.record(result);
}

#[when("the reservation is returned")]
fn the_reservation_is_returned(world: &ReservationWorld) {
    let id = world.first_reservation();
    let result = world
        .runtime
        .block_on(world.state.reservations.return_reservation(id));
    world.record(result);
}

#[when("reservation {label} is accepted")]
fn reservation_is_accepted(world: &ReservationWorld, label: String) {
    let id = world.labelled(&label);
    let result = world.runtime.block_on(world.state.reservations.accept(id));
    world.record(result);
}

#[when("both reservations are accepted at once")]
fn both_reservations_are_accepted_at_once(world: &ReservationWorld) {
    let ids = world.reservations.borrow().clone();
    let [first, second] = ids.as_slice() else {
        panic!("expected two reservations, got {}", ids.len());
    };
    let commands = &world.state.reservations;
    let (a, b) = world.runtime.block_on(async {
        futures_util::join!(commands.accept(*first), commands.accept(*second))
    });
    a.expect("first accept");
    b.expect("second accept");
}

#[then("the reservation status is {status}")]
fn the_reservation_status_is(world: &ReservationWorld, status: String) {
    assert!(
        world.last_error.borrow().is_none(),
        "unexpected error: {:?}",
        world.last_error.borrow()
    );
    let reservation = world.reservation(world.first_reservation());
    assert_eq!(reservation.status.as_str(), status);
}

#[then("reservation {label} is {status}")]
fn reservation_has_status(world: &ReservationWorld, label: String, status: String) {
    assert!(
        world.last_error.borrow().is_none(),
        "unexpected error: {:?}",
        world.last_error.borrow()
    );
    let reservation = world.reservation(world.labelled(&label));
    assert_eq!(reservation.status.as_str(), status);
}

#[then("the element stock is {stock}")]
fn the_element_stock_is(world: &ReservationWorld, stock: u32) {
    let element = world
        .runtime
        .block_on(world.state.elements.get(world.element_id()))
        .expect("element exists");
    assert_eq!(element.stock, stock);
}

#[then("one reservation is accepted and the other is out_of_stock")]
fn one_reservation_is_accepted_and_the_other_is_out_of_stock(world: &ReservationWorld) {
    let mut statuses: Vec<&str> = world
        .reservations
        .borrow()
        .iter()
        .map(|id| world.reservation(*id).status.as_str())
        .collect();
    statuses.sort_unstable();
    assert_eq!(statuses, ["accepted", "out_of_stock"]);
}

#[then("the request fails with {code}")]
fn the_request_fails_with(world: &ReservationWorld, code: String) {
    let error = world.last_error.borrow_mut().take().expect("request failed");
    let actual = serde_json::to_value(error.code()).expect("serialisable code");
    assert_eq!(actual, code.as_str());
}

#[then("the reader may edit their own user data")]
fn the_reader_may_edit_their_own_user_data(world: &ReservationWorld) {
    let reader = world.reader.borrow().clone().expect("reader actor");
    assert!(authorize(Action::Edit, ResourceKind::UserData, &reader).is_ok());
}

#[then("the reader may not accept reservations")]
fn the_reader_may_not_accept_reservations(world: &ReservationWorld) {
    let reader = world.reader.borrow().clone().expect("reader actor");
    let error = authorize(Action::Accept, ResourceKind::Reservation, &reader)
        .expect_err("accept is reserved to administrators");
    let code = serde_json::to_value(error.code()).expect("serialisable code");
    assert_eq!(code, "forbidden");
}

#[scenario(path = "tests/features/reservation_workflow.feature")]
fn reservation_workflow_scenarios(world: ReservationWorld) {
    drop(world);
}
