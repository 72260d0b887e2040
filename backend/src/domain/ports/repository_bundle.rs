//! Bundle of driven adapters handed to the service wiring.

use std::sync::Arc;

/// One adapter per repository port.
///
/// The type parameters are the concrete adapters; the wiring code bounds each
/// by the port it must implement.
#[derive(Debug)]
pub struct RepositoryBundle<E, C, T, A, R, U> {
    /// Element adapter.
    pub elements: Arc<E>,
    /// Category adapter.
    pub categories: Arc<C>,
    /// Tag adapter.
    pub tags: Arc<T>,
    /// Author adapter.
    pub authors: Arc<A>,
    /// Reservation adapter.
    pub reservations: Arc<R>,
    /// User adapter.
    pub users: Arc<U>,
}

impl<S> RepositoryBundle<S, S, S, S, S, S> {
    /// Use one store for every port.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use lending_backend::domain::ports::RepositoryBundle;
    /// use lending_backend::outbound::memory::InMemoryStore;
    ///
    /// let bundle = RepositoryBundle::shared(Arc::new(InMemoryStore::new()));
    /// assert!(Arc::ptr_eq(&bundle.elements, &bundle.reservations));
    /// ```
    pub fn shared(store: Arc<S>) -> Self {
        Self {
            elements: Arc::clone(&store),
            categories: Arc::clone(&store),
            tags: Arc::clone(&store),
            authors: Arc::clone(&store),
            reservations: Arc::clone(&store),
            users: store,
        }
    }
}
