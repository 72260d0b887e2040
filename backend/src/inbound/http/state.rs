//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` and only see driving
//! ports, so they stay testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    ClassificationCatalogue, ClassificationRepository, ElementCatalogue, ElementRepository,
    LoginService, PasswordHasher, RepositoryBundle, ReservationCommand, ReservationQuery,
    ReservationRepository, UserAccounts, UserRepository,
};
use crate::domain::{
    Author, Category, ClassificationService, ElementService, RecordingLoginService,
    ReservationService, Tag, UserAccountService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential check.
    pub login: Arc<dyn LoginService>,
    /// Registration, account queries, and self-service edits.
    pub users: Arc<dyn UserAccounts>,
    /// Reservation workflow commands.
    pub reservations: Arc<dyn ReservationCommand>,
    /// Reservation reads.
    pub reservations_query: Arc<dyn ReservationQuery>,
    /// Element maintenance and browsing.
    pub elements: Arc<dyn ElementCatalogue>,
    /// Category maintenance.
    pub categories: Arc<dyn ClassificationCatalogue<Category>>,
    /// Tag maintenance.
    pub tags: Arc<dyn ClassificationCatalogue<Tag>>,
    /// Author maintenance.
    pub authors: Arc<dyn ClassificationCatalogue<Author>>,
}

/// Collaborators the domain services need besides repositories.
pub struct ServiceAdapters<L, H> {
    /// Authenticator for accounts without a stored password.
    pub authenticator: Arc<L>,
    /// Hashes and verifies stored passwords.
    pub hasher: Arc<H>,
    /// Source of entity timestamps.
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Wire the domain services over a set of repository adapters.
    ///
    /// Accounts returned by the authenticator are recorded in the user
    /// repository on every successful login.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use lending_backend::domain::ports::{FixtureLoginService, RepositoryBundle};
    /// use lending_backend::inbound::http::state::{HttpState, ServiceAdapters};
    /// use lending_backend::outbound::memory::InMemoryStore;
    /// use lending_backend::outbound::password::Argon2PasswordHasher;
    /// use mockable::DefaultClock;
    ///
    /// let repositories = RepositoryBundle::shared(Arc::new(InMemoryStore::new()));
    /// let adapters = ServiceAdapters {
    ///     authenticator: Arc::new(FixtureLoginService),
    ///     hasher: Arc::new(Argon2PasswordHasher::default()),
    ///     clock: Arc::new(DefaultClock),
    /// };
    /// let state = HttpState::from_repositories(repositories, adapters);
    /// let _elements = state.elements.clone();
    /// ```
    pub fn from_repositories<E, C, T, A, R, U, L, H>(
        repositories: RepositoryBundle<E, C, T, A, R, U>,
        adapters: ServiceAdapters<L, H>,
    ) -> Self
    where
        E: ElementRepository + 'static,
        C: ClassificationRepository<Category> + 'static,
        T: ClassificationRepository<Tag> + 'static,
        A: ClassificationRepository<Author> + 'static,
        R: ReservationRepository + 'static,
        U: UserRepository + 'static,
        L: LoginService + 'static,
        H: PasswordHasher + 'static,
    {
        let ServiceAdapters {
            authenticator,
            hasher,
            clock,
        } = adapters;
        let RepositoryBundle {
            elements,
            categories,
            tags,
            authors,
            reservations,
            users,
        } = repositories;
        let reservation_service = Arc::new(ReservationService::new(
            reservations,
            Arc::clone(&elements),
            Arc::clone(&clock),
        ));
        Self {
            login: Arc::new(RecordingLoginService::new(
                authenticator,
                Arc::clone(&users),
                Arc::clone(&hasher),
            )),
            users: Arc::new(UserAccountService::new(users, hasher)),
            reservations: reservation_service.clone(),
            reservations_query: reservation_service,
            elements: Arc::new(ElementService::new(
                Arc::clone(&elements),
                Arc::clone(&categories),
                Arc::clone(&tags),
                Arc::clone(&authors),
                Arc::clone(&clock),
            )),
            categories: Arc::new(ClassificationService::<Category, _, _>::new(
                categories,
                Arc::clone(&elements),
                Arc::clone(&clock),
            )),
            tags: Arc::new(ClassificationService::<Tag, _, _>::new(
                tags,
                Arc::clone(&elements),
                Arc::clone(&clock),
            )),
            authors: Arc::new(ClassificationService::<Author, _, _>::new(
                authors, elements, clock,
            )),
        }
    }
}
