//! In-memory persistence for users, sessions, documents, and stored-PDF
//! records.
//!
//! Repositories are unit structs whose associated functions take a
//! [`MemoryStore`] handle, so handlers read the same way they would against a
//! connection pool.

pub mod error;
pub mod models;
pub mod repositories;
pub mod seed;
pub mod store;

pub use error::DbError;
pub use store::MemoryStore;

/// Handle passed to every repository call.
pub type DbPool = MemoryStore;
