//! Request handlers.
//!
//! Handlers stay thin: they extract and authorize, delegate to the
//! repositories in `realeagent_db` and the document [`pipeline`](crate::pipeline),
//! and map errors via [`AppError`](crate::error::AppError).

pub mod auth;
pub mod documents;
pub mod properties;
pub mod templates;
pub mod transactions;
