/// Errors produced while loading, filling, or serializing a PDF.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// The input bytes could not be parsed as a PDF.
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF parsed but is missing a structure the filler needs.
    #[error("Malformed PDF structure: {0}")]
    Structure(String),

    /// The PDF is encrypted in a way that cannot be opened without a password.
    #[error("Cannot decrypt PDF: {0}")]
    Encrypted(String),

    /// Writing a content stream or the final document failed.
    #[error("Failed to write PDF: {0}")]
    Write(String),
}

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        PdfError::Structure(err.to_string())
    }
}
