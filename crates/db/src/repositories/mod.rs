//! Repository layer: one unit struct per table.

pub mod document_record_repo;
pub mod document_repo;
pub mod property_repo;
pub mod session_repo;
pub mod user_repo;

pub use document_record_repo::DocumentRecordRepo;
pub use document_repo::DocumentRepo;
pub use property_repo::PropertyRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
