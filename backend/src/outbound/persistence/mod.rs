//! PostgreSQL adapters for the lending ports, built on Diesel.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private; repositories translate rows into domain values and map Diesel
//! failures onto the port error enums. Connections come from a `bb8` pool
//! through `diesel-async`.
//!
//! ```ignore
//! use lending_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/lending")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

mod diesel_basic_error_mapping;
pub(crate) mod diesel_helpers;
mod diesel_classification_repository;
mod diesel_element_repository;
mod diesel_reservation_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_classification_repository::DieselClassificationRepository;
pub use diesel_element_repository::DieselElementRepository;
pub use diesel_reservation_repository::DieselReservationRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
