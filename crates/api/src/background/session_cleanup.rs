//! Periodic removal of expired sessions.

use std::time::Duration;

use realeagent_db::repositories::SessionRepo;
use realeagent_db::DbPool;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Run the session cleanup loop until the task is aborted.
pub async fn run(pool: DbPool) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Session cleanup job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
    loop {
        interval.tick().await;
        let removed = SessionRepo::cleanup_expired(&pool).await;
        if removed > 0 {
            tracing::info!(removed, "Session cleanup: purged expired sessions");
        } else {
            tracing::debug!("Session cleanup: nothing to purge");
        }
    }
}
