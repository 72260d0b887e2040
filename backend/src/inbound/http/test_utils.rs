//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use mockable::DefaultClock;
use serde_json::json;

use crate::domain::ports::{FixtureLoginService, RepositoryBundle};
use crate::inbound::http::configure;
use crate::inbound::http::state::{HttpState, ServiceAdapters};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::password::Argon2PasswordHasher;

/// Fixture administrator e-mail.
pub const ADMIN_EMAIL: &str = "admin@example.org";
/// Fixture reader e-mail.
pub const READER_EMAIL: &str = "reader@example.org";

/// Build a session middleware configured for tests.
///
/// Uses a fresh key per invocation and disables the `Secure` flag for plain
/// HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Argon2 hasher with the smallest allowed cost, to keep tests quick.
pub fn cheap_hasher() -> Argon2PasswordHasher {
    let params = argon2::Params::new(argon2::Params::MIN_M_COST, 1, 1, None)
        .expect("minimum argon2 params are valid");
    Argon2PasswordHasher::new(params)
}

/// Handler state over a fresh in-memory store and the fixture accounts.
pub fn memory_state() -> (InMemoryStore, HttpState) {
    let store = InMemoryStore::new();
    let state = HttpState::from_repositories(
        RepositoryBundle::shared(Arc::new(store.clone())),
        ServiceAdapters {
            authenticator: Arc::new(FixtureLoginService),
            hasher: Arc::new(cheap_hasher()),
            clock: Arc::new(DefaultClock),
        },
    );
    (store, state)
}

/// The full `/api/v1` surface over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(test_session_middleware())
        .app_data(web::Data::new(state))
        .service(web::scope("/api/v1").configure(configure))
}

/// `POST /api/v1/login` for a fixture account.
pub fn login_request(email: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": email, "password": "password" }))
}

/// Extract the session cookie set by a successful response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    assert!(
        res.status().is_success(),
        "expected success, got {}",
        res.status()
    );
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
