//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by outbound adapters.
//! Driving ports ([`ReservationCommand`], [`ElementCatalogue`], ...) are
//! implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod catalogue_commands;
mod classification_repository;
mod element_repository;
mod login_service;
mod password_hasher;
mod reservation_command;
mod repository_bundle;
mod reservation_repository;
mod user_accounts;
mod user_repository;

#[cfg(test)]
pub use catalogue_commands::MockElementCatalogue;
pub use catalogue_commands::{ClassificationCatalogue, ElementCatalogue};
pub use classification_repository::{CatalogueRepositoryError, ClassificationRepository};
#[cfg(test)]
pub use element_repository::MockElementRepository;
pub use element_repository::{ElementRepository, ElementRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FIXTURE_ACCOUNTS, FixtureAccount, FixtureLoginService, LoginService};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use reservation_command::{LendingOutcome, ReservationCommand, ReservationQuery};
#[cfg(test)]
pub use reservation_command::{MockReservationCommand, MockReservationQuery};
pub use repository_bundle::RepositoryBundle;
#[cfg(test)]
pub use reservation_repository::MockReservationRepository;
pub use reservation_repository::{
    ReservationRepository, ReservationRepositoryError, StatusTransition, TransitionCommit,
};
#[cfg(test)]
pub use user_accounts::MockUserAccounts;
pub use user_accounts::UserAccounts;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserRepository, UserRepositoryError};
