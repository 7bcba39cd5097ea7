//! Filling named AcroForm fields.

use lopdf::{Document, Object, StringFormat};
use serde::Serialize;
use serde_json::Value;

use realeagent_core::forms::{
    format_value, is_blank, is_checked, normalize_field_name, FieldType, FormFieldMapping,
};
use realeagent_core::types::FieldMap;

use crate::error::PdfError;
use crate::form::{root_id, widget_on_state, FieldKind, FormField, PdfForm};
use crate::overlay;
use crate::text::encode_text_string;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    /// Values were written into named AcroForm fields.
    FormFields,
    /// The PDF had no fields; values were drawn at mapping coordinates.
    Coordinates,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedField {
    pub name: String,
    pub reason: String,
}

/// Outcome of a fill, returned to API callers alongside the document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReport {
    pub strategy: FillStrategy,
    pub filled: Vec<String>,
    /// Fields (or mappings) for which no value was supplied.
    pub unmatched: Vec<String>,
    pub skipped: Vec<SkippedField>,
}

impl FillReport {
    pub(crate) fn new(strategy: FillStrategy) -> Self {
        Self {
            strategy,
            filled: Vec::new(),
            unmatched: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub(crate) fn skip(&mut self, name: &str, reason: impl Into<String>) {
        self.skipped.push(SkippedField {
            name: name.to_string(),
            reason: reason.into(),
        });
    }
}

impl PdfForm {
    /// Write `values` into the form.
    ///
    /// Named fields are filled when the document has any; otherwise each
    /// mapping is drawn as text at its coordinates.
    pub fn fill(
        &mut self,
        values: &FieldMap,
        mappings: &[FormFieldMapping],
    ) -> Result<FillReport, PdfError> {
        let fields = self.fields();
        if fields.is_empty() {
            return overlay::draw_mappings(&mut self.doc, values, mappings);
        }

        let mut report = FillReport::new(FillStrategy::FormFields);
        for field in &fields {
            match field.kind {
                FieldKind::Signature => {
                    report.skip(&field.name, "signature fields are signed, not filled");
                    continue;
                }
                FieldKind::Unknown => {
                    report.skip(&field.name, "unsupported field type");
                    continue;
                }
                FieldKind::Text | FieldKind::Checkbox | FieldKind::Choice => {}
            }

            let Some((value, mapped_type)) = lookup_value(&field.name, values, mappings) else {
                report.unmatched.push(field.name.clone());
                continue;
            };

            if field.kind == FieldKind::Checkbox {
                set_checkbox(&mut self.doc, field, is_checked(value))?;
                report.filled.push(field.name.clone());
                continue;
            }

            let formatted = format_value(mapped_type.unwrap_or(FieldType::Text), value);
            match formatted.as_text() {
                Some(text) => {
                    set_text(&mut self.doc, field, text)?;
                    report.filled.push(field.name.clone());
                }
                None => report.unmatched.push(field.name.clone()),
            }
        }

        if !report.filled.is_empty() {
            set_need_appearances(&mut self.doc)?;
        }

        tracing::debug!(
            filled = report.filled.len(),
            unmatched = report.unmatched.len(),
            skipped = report.skipped.len(),
            "Filled AcroForm fields"
        );
        Ok(report)
    }
}

/// Find the value for a PDF field: by mapping, then exact key, then
/// normalized key. Returns the mapping's declared type when one matched.
fn lookup_value<'a>(
    field_name: &str,
    values: &'a FieldMap,
    mappings: &[FormFieldMapping],
) -> Option<(&'a Value, Option<FieldType>)> {
    let normalized = normalize_field_name(field_name);
    let present = |v: &&Value| !is_blank(Some(*v));

    let mapped = mappings.iter().find(|m| {
        m.field_name == field_name || normalize_field_name(&m.field_name) == normalized
    });
    if let Some(mapping) = mapped {
        if let Some(value) = values.get(mapping.data_key()).filter(present) {
            return Some((value, Some(mapping.field_type)));
        }
    }

    if let Some(value) = values.get(field_name).filter(present) {
        return Some((value, None));
    }

    values
        .iter()
        .find(|(key, v)| normalize_field_name(key) == normalized && present(v))
        .map(|(_, v)| (v, None))
}

fn set_text(doc: &mut Document, field: &FormField, text: &str) -> Result<(), PdfError> {
    let encoded = encode_text_string(text);
    let format = if encoded.starts_with(&[0xFE, 0xFF]) {
        StringFormat::Hexadecimal
    } else {
        StringFormat::Literal
    };

    doc.get_dictionary_mut(field.id)?
        .set("V", Object::String(encoded, format));

    // Stale appearance streams would hide the new value; viewers rebuild them
    // from NeedAppearances.
    for widget in &field.widgets {
        if let Ok(dict) = doc.get_dictionary_mut(*widget) {
            dict.remove(b"AP");
        }
    }
    Ok(())
}

fn set_checkbox(doc: &mut Document, field: &FormField, checked: bool) -> Result<(), PdfError> {
    let on = field.on_state.clone().unwrap_or_else(|| b"Yes".to_vec());

    let widget_states: Vec<(lopdf::ObjectId, Vec<u8>)> = field
        .widgets
        .iter()
        .map(|w| {
            let own_on = widget_on_state(doc, *w);
            let state = match own_on {
                Some(ref s) if checked && (!field.radio || *s == on) => s.clone(),
                None if checked => on.clone(),
                _ => b"Off".to_vec(),
            };
            (*w, state)
        })
        .collect();

    let value = if checked { on } else { b"Off".to_vec() };
    doc.get_dictionary_mut(field.id)?
        .set("V", Object::Name(value));

    for (widget, state) in widget_states {
        if let Ok(dict) = doc.get_dictionary_mut(widget) {
            dict.set("AS", Object::Name(state));
        }
    }
    Ok(())
}

fn set_need_appearances(doc: &mut Document) -> Result<(), PdfError> {
    let root = root_id(doc)?;
    let acroform_ref = match doc.get_dictionary(root)?.get(b"AcroForm") {
        Ok(Object::Reference(id)) => Some(*id),
        Ok(_) => None,
        Err(_) => return Err(PdfError::Structure("catalog has no /AcroForm".into())),
    };

    match acroform_ref {
        Some(id) => {
            if let Ok(acroform) = doc.get_dictionary_mut(id) {
                acroform.set("NeedAppearances", true);
            }
        }
        None => {
            if let Ok(Object::Dictionary(acroform)) =
                doc.get_dictionary_mut(root)?.get_mut(b"AcroForm")
            {
                acroform.set("NeedAppearances", true);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::tests::sample_form_bytes;
    use crate::text::decode_text_string;
    use serde_json::json;

    fn values(v: Value) -> FieldMap {
        v.as_object().cloned().expect("object literal")
    }

    fn field_dict<'a>(form: &'a PdfForm, name: &str) -> &'a lopdf::Dictionary {
        let field = form
            .fields()
            .into_iter()
            .find(|f| f.name == name)
            .expect("field present");
        form.doc.get_dictionary(field.id).expect("field dictionary")
    }

    fn text_value(form: &PdfForm, name: &str) -> Option<String> {
        match field_dict(form, name).get(b"V") {
            Ok(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
            _ => None,
        }
    }

    #[test]
    fn fills_fields_by_mapping_exact_and_normalized_name() {
        let mut form = PdfForm::load(&sample_form_bytes()).expect("load");
        let mappings = vec![
            FormFieldMapping::new("Buyer Name", FieldType::Text, 1, 0.0, 0.0, 0.0, 0.0)
                .with_key("buyerName"),
        ];
        let report = form
            .fill(
                &values(json!({
                    "buyerName": "Jane Buyer",
                    "All Cash": true,
                    "buyer_phone": "555-0100",
                })),
                &mappings,
            )
            .expect("fill");

        assert_eq!(report.strategy, FillStrategy::FormFields);
        assert_eq!(report.filled, vec!["Buyer Name", "All Cash", "Buyer.Phone"]);
        assert!(report.unmatched.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "Buyer Signature");

        let bytes = form.to_bytes().expect("serialize");
        let reloaded = PdfForm::load(&bytes).expect("reload");
        assert_eq!(text_value(&reloaded, "Buyer Name").as_deref(), Some("Jane Buyer"));
        assert_eq!(text_value(&reloaded, "Buyer.Phone").as_deref(), Some("555-0100"));
    }

    #[test]
    fn checkbox_uses_custom_on_state() {
        let mut form = PdfForm::load(&sample_form_bytes()).expect("load");
        form.fill(&values(json!({ "All Cash": "yes" })), &[])
            .expect("fill");

        let dict = field_dict(&form, "All Cash");
        assert_eq!(dict.get(b"V").ok(), Some(&Object::Name(b"Checked".to_vec())));
        assert_eq!(dict.get(b"AS").ok(), Some(&Object::Name(b"Checked".to_vec())));
    }

    #[test]
    fn unchecked_checkbox_is_off() {
        let mut form = PdfForm::load(&sample_form_bytes()).expect("load");
        form.fill(&values(json!({ "All Cash": false })), &[])
            .expect("fill");

        let dict = field_dict(&form, "All Cash");
        assert_eq!(dict.get(b"AS").ok(), Some(&Object::Name(b"Off".to_vec())));
    }

    #[test]
    fn mapped_currency_is_formatted() {
        let mut form = PdfForm::load(&sample_form_bytes()).expect("load");
        let mappings = vec![FormFieldMapping::new(
            "Buyer Name",
            FieldType::Currency,
            1,
            0.0,
            0.0,
            0.0,
            0.0,
        )
        .with_key("purchasePrice")];
        form.fill(&values(json!({ "purchasePrice": 1250000 })), &mappings)
            .expect("fill");
        assert_eq!(text_value(&form, "Buyer Name").as_deref(), Some("$1,250,000"));
    }

    #[test]
    fn blank_values_are_unmatched_and_need_appearances_is_set() {
        let mut form = PdfForm::load(&sample_form_bytes()).expect("load");
        let report = form
            .fill(&values(json!({ "Buyer Name": "  ", "All Cash": true })), &[])
            .expect("fill");
        assert!(report.unmatched.contains(&"Buyer Name".to_string()));

        let root = root_id(&form.doc).expect("root");
        let acroform_id = match form.doc.get_dictionary(root).expect("catalog").get(b"AcroForm") {
            Ok(Object::Reference(id)) => *id,
            other => panic!("unexpected AcroForm entry: {other:?}"),
        };
        let acroform = form.doc.get_dictionary(acroform_id).expect("acroform");
        assert_eq!(acroform.get(b"NeedAppearances").ok(), Some(&Object::Boolean(true)));
    }

    #[test]
    fn non_latin_values_are_written_as_utf16() {
        let mut form = PdfForm::load(&sample_form_bytes()).expect("load");
        form.fill(&values(json!({ "Buyer Name": "Zoë 王" })), &[])
            .expect("fill");
        assert_eq!(text_value(&form, "Buyer Name").as_deref(), Some("Zoë 王"));
    }
}
