pub mod document;
pub mod document_record;
pub mod session;
pub mod user;
