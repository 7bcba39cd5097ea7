//! PDF form filling on top of `lopdf`.
//!
//! [`PdfForm`] loads a template PDF (decrypting it), enumerates its
//! AcroForm fields, fills them by name, and falls back to drawing text at
//! mapped coordinates when the document has no fields.

mod crypt;
pub mod error;
pub mod fill;
pub mod form;
mod overlay;
pub mod text;

pub use error::PdfError;
pub use fill::{FillReport, FillStrategy, SkippedField};
pub use form::{FieldKind, FormField, PdfForm};
