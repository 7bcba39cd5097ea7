//! Loading, inspecting, and serializing fillable PDFs.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use serde::Serialize;

use crate::crypt;
use crate::error::PdfError;
use crate::text::decode_text_string;

/// US-Letter media box in points.
pub const LETTER_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

/// Field-tree nesting beyond this depth is treated as a cycle.
const MAX_FIELD_DEPTH: usize = 32;

/// `Ff` bit for radio buttons.
const FF_RADIO: i64 = 1 << 15;
/// `Ff` bit for push buttons.
const FF_PUSHBUTTON: i64 = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Checkbox,
    Choice,
    Signature,
    Unknown,
}

impl FieldKind {
    fn from_flags(field_type: Option<&[u8]>, flags: i64) -> Self {
        match field_type {
            Some(b"Tx") => Self::Text,
            Some(b"Ch") => Self::Choice,
            Some(b"Sig") => Self::Signature,
            Some(b"Btn") if flags & FF_PUSHBUTTON != 0 => Self::Unknown,
            Some(b"Btn") => Self::Checkbox,
            _ => Self::Unknown,
        }
    }
}

/// A terminal AcroForm field.
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    /// Fully qualified name, parent names joined with `.`.
    pub name: String,
    pub kind: FieldKind,
    #[serde(skip)]
    pub(crate) id: ObjectId,
    /// Widget annotations carrying `/AS`. The field itself when merged.
    #[serde(skip)]
    pub(crate) widgets: Vec<ObjectId>,
    /// Appearance name for the checked state of a button.
    #[serde(skip)]
    pub(crate) on_state: Option<Vec<u8>>,
    #[serde(skip)]
    pub(crate) radio: bool,
}

/// An editable PDF held in memory.
#[derive(Debug)]
pub struct PdfForm {
    pub(crate) doc: Document,
    decrypted: bool,
}

impl PdfForm {
    /// Parse `bytes`, removing any encryption so the output is editable.
    ///
    /// Encrypted input is opened with the empty user password. A document
    /// that cannot be decrypted is an error rather than a half-readable form.
    pub fn load(bytes: &[u8]) -> Result<Self, PdfError> {
        let mut doc = Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;

        let decrypted = doc.is_encrypted();
        if decrypted {
            crypt::remove_encryption(&mut doc)?;
        }
        if let Ok(root_id) = root_id(&doc) {
            if let Ok(catalog) = doc.get_dictionary_mut(root_id) {
                catalog.remove(b"Perms");
            }
        }

        Ok(Self { doc, decrypted })
    }

    /// A fresh document of `page_count` empty US-Letter pages.
    pub fn blank(page_count: u32) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = (0..page_count.max(1))
            .map(|_| {
                let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => LETTER_MEDIA_BOX.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
                    "Resources" => dictionary! {},
                    "Contents" => content_id,
                });
                Object::Reference(page_id)
            })
            .collect();

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            decrypted: false,
        }
    }

    /// Whether an encryption dictionary was removed on load.
    pub fn was_decrypted(&self) -> bool {
        self.decrypted
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Every terminal AcroForm field in document order.
    pub fn fields(&self) -> Vec<FormField> {
        let mut out = Vec::new();
        let Some(acroform) = acroform(&self.doc) else {
            return out;
        };
        let Some(Object::Array(roots)) = acroform
            .get(b"Fields")
            .ok()
            .and_then(|o| resolve(&self.doc, o))
        else {
            return out;
        };

        for root in roots {
            if let Object::Reference(id) = root {
                walk_field(&self.doc, *id, None, None, 0, 0, &mut out);
            }
        }
        out
    }

    /// Serialize the document.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, PdfError> {
        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| PdfError::Write(e.to_string()))?;
        Ok(buf)
    }
}

// ---------------------------------------------------------------------------
// Object helpers
// ---------------------------------------------------------------------------

pub(crate) fn root_id(doc: &Document) -> Result<ObjectId, PdfError> {
    match doc.trailer.get(b"Root") {
        Ok(Object::Reference(id)) => Ok(*id),
        _ => Err(PdfError::Structure("trailer has no /Root reference".into())),
    }
}

/// Follow a reference once; direct objects are returned as-is.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

pub(crate) fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj)? {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

fn acroform(doc: &Document) -> Option<&Dictionary> {
    let catalog = doc.get_dictionary(root_id(doc).ok()?).ok()?;
    resolve_dict(doc, catalog.get(b"AcroForm").ok()?)
}

fn name_of(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::Name(n) => Some(n),
        _ => None,
    }
}

fn kid_ids(doc: &Document, dict: &Dictionary) -> Vec<ObjectId> {
    match dict.get(b"Kids").ok().and_then(|o| resolve(doc, o)) {
        Some(Object::Array(kids)) => kids
            .iter()
            .filter_map(|k| match k {
                Object::Reference(id) => Some(*id),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_field(
    doc: &Document,
    id: ObjectId,
    parent_name: Option<&str>,
    inherited_type: Option<&[u8]>,
    inherited_flags: i64,
    depth: usize,
    out: &mut Vec<FormField>,
) {
    if depth > MAX_FIELD_DEPTH {
        tracing::warn!(?id, "AcroForm field tree too deep, ignoring subtree");
        return;
    }
    let Ok(dict) = doc.get_dictionary(id) else {
        return;
    };

    let partial = match dict.get(b"T") {
        Ok(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
        _ => None,
    };
    let name = match (parent_name, partial) {
        (Some(parent), Some(part)) => format!("{parent}.{part}"),
        (None, Some(part)) => part,
        (Some(parent), None) => parent.to_string(),
        (None, None) => return,
    };

    let field_type = dict.get(b"FT").ok().and_then(name_of).or(inherited_type);
    let flags = match dict.get(b"Ff") {
        Ok(Object::Integer(f)) => *f,
        _ => inherited_flags,
    };

    let kids = kid_ids(doc, dict);
    let child_fields: Vec<ObjectId> = kids
        .iter()
        .copied()
        .filter(|kid| {
            doc.get_dictionary(*kid)
                .map(|d| d.has(b"T"))
                .unwrap_or(false)
        })
        .collect();

    if !child_fields.is_empty() {
        for kid in child_fields {
            walk_field(doc, kid, Some(&name), field_type, flags, depth + 1, out);
        }
        return;
    }

    let widgets = if kids.is_empty() { vec![id] } else { kids };
    let kind = FieldKind::from_flags(field_type, flags);
    let on_state = if kind == FieldKind::Checkbox {
        Some(find_on_state(doc, &widgets).unwrap_or_else(|| b"Yes".to_vec()))
    } else {
        None
    };

    out.push(FormField {
        name,
        kind,
        id,
        widgets,
        on_state,
        radio: field_type == Some(b"Btn".as_slice()) && flags & FF_RADIO != 0,
    });
}

/// First non-`Off` key of a widget's normal appearance dictionary.
fn find_on_state(doc: &Document, widgets: &[ObjectId]) -> Option<Vec<u8>> {
    widgets.iter().find_map(|w| widget_on_state(doc, *w))
}

pub(crate) fn widget_on_state(doc: &Document, widget: ObjectId) -> Option<Vec<u8>> {
    let dict = doc.get_dictionary(widget).ok()?;
    let ap = resolve_dict(doc, dict.get(b"AP").ok()?)?;
    let normal = resolve_dict(doc, ap.get(b"N").ok()?)?;
    normal
        .iter()
        .map(|(key, _)| key)
        .find(|key| key.as_slice() != b"Off")
        .cloned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
