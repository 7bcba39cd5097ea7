//! User entity model and DTOs.

use serde::Serialize;
use realeagent_core::types::{Timestamp, UserId};

/// Full user record.
///
/// Contains the password hash -- never serialize this to API responses.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub brokerage: Option<String>,
    pub license_number: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// Safe user representation for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: String,
    pub brokerage: Option<String>,
    pub license_number: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
            brokerage: user.brokerage.clone(),
            license_number: user.license_number.clone(),
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub brokerage: Option<String>,
    pub license_number: Option<String>,
}
