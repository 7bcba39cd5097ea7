//! Coordinate fallback: draw values as Helvetica text when a PDF has no
//! named fields.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use realeagent_core::forms::{format_value, is_blank, FormFieldMapping, FormattedValue};
use realeagent_core::types::FieldMap;

use crate::error::PdfError;
use crate::fill::{FillReport, FillStrategy};
use crate::form::resolve_dict;
use crate::text::{encode_drawn_text, fit_text};

/// Resource name of the overlay font on each page.
const OVERLAY_FONT: &str = "RAHelv";
const MAX_FONT_SIZE: f32 = 10.0;
const MIN_FONT_SIZE: f32 = 6.0;
/// Horizontal inset from the mapping's left edge.
const PADDING: f32 = 1.0;
const MAX_PARENT_DEPTH: usize = 32;

pub(crate) fn draw_mappings(
    doc: &mut Document,
    values: &FieldMap,
    mappings: &[FormFieldMapping],
) -> Result<FillReport, PdfError> {
    let pages = doc.get_pages();
    let mut report = FillReport::new(FillStrategy::Coordinates);
    let mut per_page: BTreeMap<u32, Vec<Operation>> = BTreeMap::new();

    for mapping in mappings {
        let name = mapping.field_name.as_str();
        let value = values.get(mapping.data_key());
        let Some(value) = value.filter(|v| !is_blank(Some(*v))) else {
            report.unmatched.push(name.to_string());
            continue;
        };

        let text = match format_value(mapping.field_type, value) {
            FormattedValue::Checked(true) => "X".to_string(),
            FormattedValue::Checked(false) => {
                report.filled.push(name.to_string());
                continue;
            }
            FormattedValue::Text(text) => text,
            FormattedValue::Empty => {
                report.unmatched.push(name.to_string());
                continue;
            }
        };

        if !pages.contains_key(&mapping.page) {
            report.skip(
                name,
                format!(
                    "page {} is out of range (document has {} pages)",
                    mapping.page,
                    pages.len()
                ),
            );
            continue;
        }

        let width = if mapping.width > 0.0 {
            mapping.width - 2.0 * PADDING
        } else {
            f32::MAX
        };
        let height = if mapping.height > 0.0 {
            mapping.height
        } else {
            MAX_FONT_SIZE
        };
        let (size, fitted) = fit_text(&text, width, height, MAX_FONT_SIZE, MIN_FONT_SIZE);
        if fitted.is_empty() {
            report.skip(name, "mapping is too narrow to draw any text");
            continue;
        }

        let baseline = mapping.y + ((height - size) / 2.0).max(0.0) + size * 0.2;
        per_page
            .entry(mapping.page)
            .or_default()
            .extend(text_operations(mapping.x + PADDING, baseline, size, &fitted));
        report.filled.push(name.to_string());
    }

    if !per_page.is_empty() {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        for (page_number, operations) in per_page {
            if let Some(&page_id) = pages.get(&page_number) {
                append_to_page(doc, page_id, font_id, operations)?;
            }
        }
    }

    tracing::debug!(
        filled = report.filled.len(),
        unmatched = report.unmatched.len(),
        skipped = report.skipped.len(),
        "Drew mapped values at coordinates"
    );
    Ok(report)
}

fn text_operations(x: f32, y: f32, size: f32, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("g", vec![Object::Integer(0)]),
        Operation::new("Tf", vec![OVERLAY_FONT.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new(
            "Tj",
            vec![Object::String(encode_drawn_text(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

/// Append `operations` after the page's existing content, isolating the
/// existing graphics state with `q`/`Q`.
fn append_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    operations: Vec<Operation>,
) -> Result<(), PdfError> {
    let mut ops = vec![Operation::new("Q", vec![])];
    ops.extend(operations);
    let encoded = Content { operations: ops }
        .encode()
        .map_err(|e| PdfError::Write(e.to_string()))?;

    let existing = existing_contents(doc, page_id);
    let resources = resources_with_font(doc, page_id, font_id);

    let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
    let overlay_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(overlay_id));

    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Contents", contents);
    page.set("Resources", resources);
    Ok(())
}

/// Content stream references of a page, flattening an indirect array.
fn existing_contents(doc: &Document, page_id: ObjectId) -> Vec<Object> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// The page's effective resources (own or inherited) with the overlay font
/// added. Shared resource objects are copied, never mutated.
fn resources_with_font(doc: &Document, page_id: ObjectId, font_id: ObjectId) -> Dictionary {
    let mut resources = effective_resources(doc, page_id)
        .cloned()
        .unwrap_or_else(Dictionary::new);

    let mut fonts = resources
        .get(b"Font")
        .ok()
        .and_then(|f| resolve_dict(doc, f))
        .cloned()
        .unwrap_or_else(Dictionary::new);
    fonts.set(OVERLAY_FONT, font_id);
    resources.set("Font", fonts);
    resources
}

fn effective_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_PARENT_DEPTH {
        if let Some(resources) = node.get(b"Resources").ok().and_then(|r| resolve_dict(doc, r)) {
            return Some(resources);
        }
        let parent = match node.get(b"Parent") {
            Ok(Object::Reference(id)) => *id,
            _ => return None,
        };
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use realeagent_core::forms::{FieldType, FormFieldMapping};
    use serde_json::json;

    use crate::fill::FillStrategy;
    use crate::form::PdfForm;

    fn mapping(name: &str, field_type: FieldType, page: u32) -> FormFieldMapping {
        FormFieldMapping::new(name, field_type, page, 72.0, 700.0, 200.0, 14.0)
    }

    fn page_text(bytes: &[u8], page: u32) -> String {
        let doc = lopdf::Document::load_mem(bytes).expect("reload");
        let page_id = doc.get_pages()[&page];
        let content = doc.get_page_content(page_id).expect("page content");
        String::from_utf8_lossy(&content).into_owned()
    }

    #[test]
    fn draws_text_currency_date_and_checkbox() {
        let mut form = PdfForm::blank(2);
        let mappings = vec![
            mapping("buyerName", FieldType::Text, 1),
            mapping("purchasePrice", FieldType::Currency, 1),
            mapping("offerDate", FieldType::Date, 2),
            mapping("allCash", FieldType::Checkbox, 2),
            mapping("financing", FieldType::Checkbox, 2),
        ];
        let values = json!({
            "buyerName": "Jane Buyer",
            "purchasePrice": 1250000,
            "offerDate": "2024-03-15",
            "allCash": true,
            "financing": false,
        });

        let report = form
            .fill(values.as_object().expect("object"), &mappings)
            .expect("fill");
        assert_eq!(report.strategy, FillStrategy::Coordinates);
        assert_eq!(report.filled.len(), 5);
        assert!(report.unmatched.is_empty());

        let bytes = form.to_bytes().expect("serialize");
        let first = page_text(&bytes, 1);
        assert!(first.contains("(Jane Buyer) Tj"), "page 1: {first}");
        assert!(first.contains("($1,250,000) Tj"), "page 1: {first}");

        let second = page_text(&bytes, 2);
        assert!(second.contains("(03/15/2024) Tj"), "page 2: {second}");
        assert!(second.contains("(X) Tj"), "page 2: {second}");
        assert_eq!(second.matches("Tj").count(), 2);
    }

    #[test]
    fn out_of_range_page_is_skipped() {
        let mut form = PdfForm::blank(1);
        let mappings = vec![mapping("sellerName", FieldType::Text, 3)];
        let values = json!({ "sellerName": "Sam Seller" });

        let report = form
            .fill(values.as_object().expect("object"), &mappings)
            .expect("fill");
        assert!(report.filled.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("page 3"));
    }

    #[test]
    fn missing_values_are_unmatched() {
        let mut form = PdfForm::blank(1);
        let mappings = vec![
            mapping("buyerName", FieldType::Text, 1),
            mapping("sellerName", FieldType::Text, 1),
        ];
        let values = json!({ "buyerName": "Jane", "sellerName": "" });

        let report = form
            .fill(values.as_object().expect("object"), &mappings)
            .expect("fill");
        assert_eq!(report.filled, vec!["buyerName"]);
        assert_eq!(report.unmatched, vec!["sellerName"]);
    }

    #[test]
    fn long_text_is_truncated_and_non_latin_replaced() {
        let mut form = PdfForm::blank(1);
        let narrow = FormFieldMapping::new(
            "notes",
            FieldType::Text,
            1,
            72.0,
            500.0,
            40.0,
            12.0,
        );
        let values = json!({ "notes": "王 and a very long note that cannot fit" });

        form.fill(values.as_object().expect("object"), &[narrow])
            .expect("fill");
        let text = page_text(&form.to_bytes().expect("serialize"), 1);
        assert!(text.contains("(? and"), "page: {text}");
        assert!(!text.contains("cannot fit"));
    }
}
