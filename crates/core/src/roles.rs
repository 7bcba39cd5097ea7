//! Well-known role name constants.
//!
//! These must match the demo users seeded by `realeagent_db::MemoryStore`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_BROKER: &str = "broker";
pub const ROLE_AGENT: &str = "agent";

/// Whether `role` may read documents owned by other agents.
pub fn can_view_all_documents(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_BROKER
}
