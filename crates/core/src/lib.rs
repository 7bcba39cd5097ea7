//! Domain types and pure rules for the RealeAgent platform.
//!
//! Nothing in this crate performs I/O: the API, storage, and PDF crates build
//! on these types.

pub mod document;
pub mod error;
pub mod forms;
pub mod property;
pub mod roles;
pub mod signature;
pub mod templates;
pub mod types;
