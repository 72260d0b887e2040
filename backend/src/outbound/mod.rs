//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: process-local store used when no database is configured and
//!   by the test suites.
//! - **password**: Argon2id password hashing.
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM.
//!
//! Adapters are thin translators between domain types and storage
//! representations. The only rule they enforce is the atomic stock update
//! that accompanies a reservation transition.

pub mod memory;
pub mod password;
pub mod persistence;
