//! Repository for bearer-token sessions.

use chrono::Utc;

use crate::models::session::{CreateSession, Session};
use crate::store::MemoryStore;

pub struct SessionRepo;

impl SessionRepo {
    /// Insert a session, replacing any existing one for the same token.
    pub async fn create(pool: &MemoryStore, input: &CreateSession) -> Session {
        let session = Session {
            token_hash: input.token_hash.clone(),
            user_id: input.user_id,
            created_at: Utc::now(),
            expires_at: input.expires_at,
        };
        pool.inner
            .sessions
            .write()
            .await
            .insert(session.token_hash.clone(), session.clone());
        session
    }

    /// Find an unexpired session by token hash.
    pub async fn find_active(pool: &MemoryStore, token_hash: &str) -> Option<Session> {
        let now = Utc::now();
        pool.inner
            .sessions
            .read()
            .await
            .get(token_hash)
            .filter(|s| s.expires_at > now)
            .cloned()
    }

    /// Remove a single session. Returns `true` if one existed.
    pub async fn revoke(pool: &MemoryStore, token_hash: &str) -> bool {
        pool.inner
            .sessions
            .write()
            .await
            .remove(token_hash)
            .is_some()
    }

    /// Drop expired sessions. Returns the count removed.
    pub async fn cleanup_expired(pool: &MemoryStore) -> u64 {
        let now = Utc::now();
        let mut sessions = pool.inner.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        (before - sessions.len()) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use realeagent_core::types::UserId;

    fn session(hash: &str, user_id: UserId, ttl: Duration) -> CreateSession {
        CreateSession {
            token_hash: hash.to_string(),
            user_id,
            expires_at: Utc::now() + ttl,
        }
    }

    #[tokio::test]
    async fn active_session_is_found_until_revoked() {
        let pool = MemoryStore::new();
        SessionRepo::create(&pool, &session("h1", 1, Duration::hours(1))).await;

        assert!(SessionRepo::find_active(&pool, "h1").await.is_some());
        assert!(SessionRepo::revoke(&pool, "h1").await);
        assert!(SessionRepo::find_active(&pool, "h1").await.is_none());
        assert!(!SessionRepo::revoke(&pool, "h1").await);
    }

    #[tokio::test]
    async fn expired_sessions_are_hidden_and_cleaned_up() {
        let pool = MemoryStore::new();
        SessionRepo::create(&pool, &session("old", 1, Duration::seconds(-5))).await;
        SessionRepo::create(&pool, &session("new", 1, Duration::hours(1))).await;

        assert!(SessionRepo::find_active(&pool, "old").await.is_none());
        assert_eq!(SessionRepo::cleanup_expired(&pool).await, 1);
        assert!(SessionRepo::find_active(&pool, "new").await.is_some());
    }
}
