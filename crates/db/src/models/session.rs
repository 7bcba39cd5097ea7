//! Bearer-token session model and DTOs.

use realeagent_core::types::{Timestamp, UserId};

#[derive(Debug, Clone)]
pub struct Session {
    pub token_hash: String,
    pub user_id: UserId,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

pub struct CreateSession {
    pub token_hash: String,
    pub user_id: UserId,
    pub expires_at: Timestamp,
}
