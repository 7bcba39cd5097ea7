//! Repository for users.

use std::sync::atomic::Ordering;

use chrono::Utc;
use realeagent_core::types::UserId;

use crate::error::DbError;
use crate::models::user::{CreateUser, User};
use crate::store::MemoryStore;

pub struct UserRepo;

impl UserRepo {
    /// Insert a new user. Emails are unique, compared case-insensitively.
    pub async fn create(pool: &MemoryStore, input: &CreateUser) -> Result<User, DbError> {
        let mut users = pool.inner.users.write().await;
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(DbError::Duplicate {
                entity: "user",
                key: input.email.clone(),
            });
        }

        let id = pool.inner.next_user_id.fetch_add(1, Ordering::SeqCst);
        let user = User {
            id,
            email: input.email.clone(),
            name: input.name.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role.clone(),
            brokerage: input.brokerage.clone(),
            license_number: input.license_number.clone(),
            is_active: true,
            created_at: Utc::now(),
        };
        users.insert(id, user.clone());
        Ok(user)
    }

    pub async fn find_by_id(pool: &MemoryStore, id: UserId) -> Option<User> {
        pool.inner.users.read().await.get(&id).cloned()
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &MemoryStore, email: &str) -> Option<User> {
        pool.inner
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned()
    }
}
