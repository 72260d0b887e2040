//! Builders for the HTTP state: PostgreSQL adapters when a pool is
//! configured, otherwise one shared in-memory store.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::info;

use lending_backend::domain::ports::{
    FixtureLoginService, LoginService, PasswordHasher, RepositoryBundle,
};
use lending_backend::inbound::http::state::{HttpState, ServiceAdapters};
use lending_backend::outbound::memory::InMemoryStore;
use lending_backend::outbound::password::Argon2PasswordHasher;
use lending_backend::outbound::persistence::{
    DbPool, DieselClassificationRepository, DieselElementRepository, DieselReservationRepository,
    DieselUserRepository,
};

use super::ServerConfig;

/// Repository bundle of Diesel adapters sharing `pool`.
type DieselBundle = RepositoryBundle<
    DieselElementRepository,
    DieselClassificationRepository,
    DieselClassificationRepository,
    DieselClassificationRepository,
    DieselReservationRepository,
    DieselUserRepository,
>;

fn diesel_bundle(pool: &DbPool) -> DieselBundle {
    let classifications = Arc::new(DieselClassificationRepository::new(pool.clone()));
    RepositoryBundle {
        elements: Arc::new(DieselElementRepository::new(pool.clone())),
        categories: Arc::clone(&classifications),
        tags: Arc::clone(&classifications),
        authors: classifications,
        reservations: Arc::new(DieselReservationRepository::new(pool.clone())),
        users: Arc::new(DieselUserRepository::new(pool.clone())),
    }
}

/// Wire the HTTP state over `pool`, or over a fresh in-memory store when
/// there is none.
fn build_http_state_with<L, H>(
    pool: Option<&DbPool>,
    adapters: ServiceAdapters<L, H>,
) -> HttpState
where
    L: LoginService + 'static,
    H: PasswordHasher + 'static,
{
    match pool {
        Some(pool) => {
            info!(adapter = "postgres", "wiring repositories");
            HttpState::from_repositories(diesel_bundle(pool), adapters)
        }
        None => {
            info!(adapter = "memory", "wiring repositories");
            HttpState::from_repositories(
                RepositoryBundle::shared(Arc::new(InMemoryStore::new())),
                adapters,
            )
        }
    }
}

fn production_adapters() -> ServiceAdapters<FixtureLoginService, Argon2PasswordHasher> {
    ServiceAdapters {
        authenticator: Arc::new(FixtureLoginService),
        hasher: Arc::new(Argon2PasswordHasher::default()),
        clock: Arc::new(DefaultClock),
    }
}

/// Build the shared HTTP state for `config`.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(build_http_state_with(
        config.db_pool.as_ref(),
        production_adapters(),
    ))
}
