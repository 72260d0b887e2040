//! In-process adapters backing every repository port.
//!
//! All tables sit behind one mutex, so a lending transition observes and
//! writes the reservation and its element in a single critical section. The
//! server falls back to this store when no database URL is configured, and the
//! behaviour tests drive it directly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    CatalogueRepositoryError, ClassificationRepository, ElementRepository, ElementRepositoryError,
    ReservationRepository, ReservationRepositoryError, StatusTransition, StoredCredentials,
    TransitionCommit, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Author, AuthorId, Category, CategoryId, Classification, Element, ElementFilter, ElementId,
    Page, PageRequest, PasswordDigest, Reservation, ReservationId, Tag, TagId, User, UserId,
    UserProfile,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Default)]
struct Tables {
    elements: HashMap<ElementId, Element>,
    categories: HashMap<CategoryId, Category>,
    tags: HashMap<TagId, Tag>,
    authors: HashMap<AuthorId, Author>,
    reservations: HashMap<ReservationId, Reservation>,
    users: HashMap<UserId, User>,
    passwords: HashMap<UserId, PasswordDigest>,
}

impl Tables {
    fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users
            .values()
            .find(|user| user.email.as_str().eq_ignore_ascii_case(email))
    }
}

/// Shared in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, String> {
        self.tables.lock().map_err(|_| POISONED.to_owned())
    }
}

fn sorted_page<T: Clone, K: Ord>(
    items: impl Iterator<Item = T>,
    page: PageRequest,
    key: impl FnMut(&T) -> K,
) -> Page<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(key);
    page.slice(&items)
}

/// Table selection for one classification kind.
trait Stored: Classification {
    fn table(tables: &mut Tables) -> &mut HashMap<Self::Id, Self>;

    /// Release element references before the entry is removed.
    ///
    /// Returns `false` when references block the deletion.
    fn release(tables: &mut Tables, id: Self::Id) -> bool;
}

impl Stored for Category {
    fn table(tables: &mut Tables) -> &mut HashMap<CategoryId, Self> {
        &mut tables.categories
    }

    fn release(tables: &mut Tables, id: CategoryId) -> bool {
        !tables
            .elements
            .values()
            .any(|element| element.category_id == id)
    }
}

impl Stored for Tag {
    fn table(tables: &mut Tables) -> &mut HashMap<TagId, Self> {
        &mut tables.tags
    }

    fn release(tables: &mut Tables, id: TagId) -> bool {
        for element in tables.elements.values_mut() {
            element.tag_ids.retain(|tag| *tag != id);
        }
        true
    }
}

impl Stored for Author {
    fn table(tables: &mut Tables) -> &mut HashMap<AuthorId, Self> {
        &mut tables.authors
    }

    fn release(tables: &mut Tables, id: AuthorId) -> bool {
        for element in tables.elements.values_mut() {
            element.author_ids.retain(|author| *author != id);
        }
        true
    }
}

#[async_trait]
impl<C: Stored> ClassificationRepository<C> for InMemoryStore {
    async fn find(&self, id: C::Id) -> Result<Option<C>, CatalogueRepositoryError> {
        let mut tables = self.lock().map_err(CatalogueRepositoryError::query)?;
        Ok(C::table(&mut tables).get(&id).cloned())
    }

    async fn first_missing(
        &self,
        ids: &[C::Id],
    ) -> Result<Option<C::Id>, CatalogueRepositoryError> {
        let mut tables = self.lock().map_err(CatalogueRepositoryError::query)?;
        let table = C::table(&mut tables);
        Ok(ids.iter().copied().find(|id| !table.contains_key(id)))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<C>, CatalogueRepositoryError> {
        let mut tables = self.lock().map_err(CatalogueRepositoryError::query)?;
        Ok(sorted_page(
            C::table(&mut tables).values().cloned(),
            page,
            |entry| entry.sort_key(),
        ))
    }

    async fn insert(&self, entry: &C) -> Result<(), CatalogueRepositoryError> {
        let mut tables = self.lock().map_err(CatalogueRepositoryError::query)?;
        C::table(&mut tables).insert(entry.id(), entry.clone());
        Ok(())
    }

    async fn update(&self, entry: &C) -> Result<bool, CatalogueRepositoryError> {
        let mut tables = self.lock().map_err(CatalogueRepositoryError::query)?;
        match C::table(&mut tables).get_mut(&entry.id()) {
            Some(stored) => {
                *stored = entry.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: C::Id) -> Result<bool, CatalogueRepositoryError> {
        let mut tables = self.lock().map_err(CatalogueRepositoryError::query)?;
        if !C::table(&mut tables).contains_key(&id) {
            return Ok(false);
        }
        if !C::release(&mut tables, id) {
            return Err(CatalogueRepositoryError::in_use(format!(
                "{} {id} is referenced by elements",
                C::KIND
            )));
        }
        Ok(C::table(&mut tables).remove(&id).is_some())
    }
}

#[async_trait]
impl ElementRepository for InMemoryStore {
    async fn find(&self, id: ElementId) -> Result<Option<Element>, ElementRepositoryError> {
        let tables = self.lock().map_err(ElementRepositoryError::query)?;
        Ok(tables.elements.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: ElementFilter,
        page: PageRequest,
    ) -> Result<Page<Element>, ElementRepositoryError> {
        let tables = self.lock().map_err(ElementRepositoryError::query)?;
        Ok(sorted_page(
            tables
                .elements
                .values()
                .filter(|element| element.matches(&filter))
                .cloned(),
            page,
            |element| (element.title.clone(), element.id),
        ))
    }

    async fn count(&self, filter: ElementFilter) -> Result<u64, ElementRepositoryError> {
        let tables = self.lock().map_err(ElementRepositoryError::query)?;
        let count = tables
            .elements
            .values()
            .filter(|element| element.matches(&filter))
            .count();
        Ok(count as u64)
    }

    async fn insert(&self, element: &Element) -> Result<(), ElementRepositoryError> {
        let mut tables = self.lock().map_err(ElementRepositoryError::query)?;
        tables.elements.insert(element.id, element.clone());
        Ok(())
    }

    async fn update(&self, element: &Element) -> Result<bool, ElementRepositoryError> {
        let mut tables = self.lock().map_err(ElementRepositoryError::query)?;
        match tables.elements.get_mut(&element.id) {
            Some(stored) => {
                *stored = element.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ElementId) -> Result<bool, ElementRepositoryError> {
        let mut tables = self.lock().map_err(ElementRepositoryError::query)?;
        let reservations = tables
            .reservations
            .values()
            .filter(|reservation| reservation.element_id == id)
            .count();
        if reservations > 0 {
            return Err(ElementRepositoryError::in_use(format!(
                "element {id} has {reservations} reservation(s)"
            )));
        }
        Ok(tables.elements.remove(&id).is_some())
    }
}

fn newest_first(reservation: &Reservation) -> (std::cmp::Reverse<DateTime<Utc>>, ReservationId) {
    (std::cmp::Reverse(reservation.created_at), reservation.id)
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn find(
        &self,
        id: ReservationId,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        let tables = self.lock().map_err(ReservationRepositoryError::query)?;
        Ok(tables.reservations.get(&id).cloned())
    }

    async fn list(
        &self,
        page: PageRequest,
    ) -> Result<Page<Reservation>, ReservationRepositoryError> {
        let tables = self.lock().map_err(ReservationRepositoryError::query)?;
        Ok(sorted_page(
            tables.reservations.values().cloned(),
            page,
            newest_first,
        ))
    }

    async fn list_by_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Reservation>, ReservationRepositoryError> {
        let tables = self.lock().map_err(ReservationRepositoryError::query)?;
        Ok(sorted_page(
            tables
                .reservations
                .values()
                .filter(|reservation| reservation.requester.user_id == Some(user_id))
                .cloned(),
            page,
            newest_first,
        ))
    }

    async fn insert(&self, reservation: &Reservation) -> Result<(), ReservationRepositoryError> {
        let mut tables = self.lock().map_err(ReservationRepositoryError::query)?;
        tables
            .reservations
            .insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn update_comment(
        &self,
        id: ReservationId,
        comment: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        let mut tables = self.lock().map_err(ReservationRepositoryError::query)?;
        Ok(tables.reservations.get_mut(&id).map(|reservation| {
            comment.clone_into(&mut reservation.comment);
            reservation.updated_at = at;
            reservation.clone()
        }))
    }

    async fn delete(&self, id: ReservationId) -> Result<bool, ReservationRepositoryError> {
        let mut tables = self.lock().map_err(ReservationRepositoryError::query)?;
        Ok(tables.reservations.remove(&id).is_some())
    }

    async fn commit_transition(
        &self,
        transition: &StatusTransition,
    ) -> Result<TransitionCommit, ReservationRepositoryError> {
        let mut guard = self.lock().map_err(ReservationRepositoryError::query)?;
        let tables = &mut *guard;
        let Some(reservation) = tables.reservations.get_mut(&transition.reservation_id) else {
            return Ok(TransitionCommit::Missing);
        };
        if reservation.status != transition.from {
            return Ok(TransitionCommit::StatusChanged {
                actual: reservation.status,
            });
        }
        let Some(element) = tables.elements.get_mut(&transition.element_id) else {
            return Ok(TransitionCommit::Missing);
        };
        let Some(stock) = transition.plan.stock.apply(element.stock) else {
            return Ok(TransitionCommit::StockExhausted);
        };
        element.stock = stock;
        reservation.status = transition.plan.to;
        reservation.updated_at = transition.at;
        Ok(TransitionCommit::Applied {
            reservation: reservation.clone(),
            stock,
        })
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn upsert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut tables = self.lock().map_err(UserRepositoryError::query)?;
        tables
            .users
            .entry(user.id)
            .and_modify(|stored| {
                stored.email = user.email.clone();
                stored.roles.clone_from(&user.roles);
                if stored.profile.is_none() {
                    stored.profile.clone_from(&user.profile);
                }
            })
            .or_insert_with(|| user.clone());
        Ok(())
    }

    async fn register(
        &self,
        user: &User,
        digest: &PasswordDigest,
    ) -> Result<(), UserRepositoryError> {
        let mut tables = self.lock().map_err(UserRepositoryError::query)?;
        if tables.user_by_email(user.email.as_str()).is_some() {
            return Err(UserRepositoryError::email_taken(user.email.as_str()));
        }
        tables.users.insert(user.id, user.clone());
        tables.passwords.insert(user.id, digest.clone());
        Ok(())
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let tables = self.lock().map_err(UserRepositoryError::query)?;
        Ok(tables.user_by_email(email).and_then(|user| {
            tables.passwords.get(&user.id).map(|digest| StoredCredentials {
                user: user.clone(),
                digest: digest.clone(),
            })
        }))
    }

    async fn find(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.lock().map_err(UserRepositoryError::query)?;
        Ok(tables.users.get(&id).cloned())
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, UserRepositoryError> {
        let tables = self.lock().map_err(UserRepositoryError::query)?;
        Ok(sorted_page(tables.users.values().cloned(), page, |user| {
            user.email.as_str().to_owned()
        }))
    }

    async fn update_profile(
        &self,
        id: UserId,
        profile: &UserProfile,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut tables = self.lock().map_err(UserRepositoryError::query)?;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.profile = Some(profile.clone());
            user.clone()
        }))
    }

    async fn update_password(
        &self,
        id: UserId,
        digest: &PasswordDigest,
    ) -> Result<bool, UserRepositoryError> {
        let mut tables = self.lock().map_err(UserRepositoryError::query)?;
        if !tables.users.contains_key(&id) {
            return Ok(false);
        }
        tables.passwords.insert(id, digest.clone());
        Ok(true)
    }
}
