//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- a bearer token backed by a live session.
//! - [`rbac::RequireBroker`] -- requires the `broker` or `admin` role.

pub mod auth;
pub mod rbac;
