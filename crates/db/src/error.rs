#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{entity} already exists: {key}")]
    Duplicate { entity: &'static str, key: String },
}
