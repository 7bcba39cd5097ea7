//! Demo accounts loaded at startup.

use realeagent_core::roles::{ROLE_ADMIN, ROLE_AGENT, ROLE_BROKER};

use crate::error::DbError;
use crate::models::user::CreateUser;
use crate::repositories::UserRepo;
use crate::store::MemoryStore;

/// Plaintext password shared by every demo account.
pub const DEMO_PASSWORD: &str = "demo1234";

/// `(email, name, role, license number)` for each demo account.
const DEMO_USERS: &[(&str, &str, &str, &str)] = &[
    ("agent@realeagent.com", "Alex Agent", ROLE_AGENT, "DRE-01234567"),
    ("broker@realeagent.com", "Blair Broker", ROLE_BROKER, "DRE-07654321"),
    ("admin@realeagent.com", "Avery Admin", ROLE_ADMIN, "DRE-00000001"),
];

const DEMO_BROKERAGE: &str = "RealeAgent Realty";

impl MemoryStore {
    /// A store seeded with the demo accounts.
    ///
    /// `password_hash` is the Argon2id PHC string for [`DEMO_PASSWORD`];
    /// hashing lives with the auth code, so callers pass it in.
    pub async fn with_demo_data(password_hash: &str) -> Result<Self, DbError> {
        let store = Self::new();
        seed_demo_users(&store, password_hash).await?;
        Ok(store)
    }
}

/// Insert the demo accounts into `pool`.
pub async fn seed_demo_users(pool: &MemoryStore, password_hash: &str) -> Result<(), DbError> {
    for (email, name, role, license) in DEMO_USERS {
        UserRepo::create(
            pool,
            &CreateUser {
                email: email.to_string(),
                name: name.to_string(),
                password_hash: password_hash.to_string(),
                role: role.to_string(),
                brokerage: Some(DEMO_BROKERAGE.to_string()),
                license_number: Some(license.to_string()),
            },
        )
        .await?;
    }
    tracing::info!(count = DEMO_USERS.len(), "Seeded demo users");
    Ok(())
}
