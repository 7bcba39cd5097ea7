//! Form-field kinds, coordinate mappings, and value formatting.
//!
//! Submitted document data is loosely typed JSON. Before a value lands in a
//! PDF field (or is drawn at a coordinate) it is formatted according to the
//! field kind: currency gets a dollar sign and thousands separators, dates are
//! rendered in the US `MM/DD/YYYY` form used by CAR forms, and checkboxes are
//! reduced to a boolean.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Output format for date fields.
pub const DATE_OUTPUT_FORMAT: &str = "%m/%d/%Y";

/// Accepted date input formats (tried in order, after RFC 3339).
const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"];

/// String values treated as a checked checkbox (compared case-insensitively).
const CHECKED_STRINGS: &[&str] = &["true", "yes", "y", "on", "1", "x", "checked"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The kind of a form field, which drives value formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    Text,
    Currency,
    Date,
    Checkbox,
    Number,
    Signature,
}

/// Placement of one template field on a PDF page.
///
/// `field_name` is the AcroForm field name when the PDF has named fields;
/// `x`/`y` are PDF points from the bottom-left corner of `page` (1-based) and
/// are used when the PDF carries no form fields at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldMapping {
    pub field_name: String,
    /// Submitted-data key feeding this field. Defaults to `field_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FormFieldMapping {
    pub fn new(
        field_name: &str,
        field_type: FieldType,
        page: u32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Self {
        Self {
            field_name: field_name.to_string(),
            key: None,
            field_type,
            page,
            x,
            y,
            width,
            height,
        }
    }

    /// Use a data key that differs from the PDF field name.
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    /// The submitted-data key this mapping reads from.
    pub fn data_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.field_name)
    }
}

/// A submitted value after type-specific formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedValue {
    Text(String),
    Checked(bool),
    Empty,
}

impl FormattedValue {
    /// Text to draw or write into a text field. Checkboxes render as `X`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Checked(true) => Some("X"),
            Self::Checked(false) | Self::Empty => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Format a submitted JSON value for a field of the given kind.
pub fn format_value(field_type: FieldType, value: &Value) -> FormattedValue {
    if field_type == FieldType::Checkbox {
        return FormattedValue::Checked(is_checked(value));
    }
    if is_blank(Some(value)) {
        return FormattedValue::Empty;
    }

    let text = match field_type {
        FieldType::Currency => format_currency_value(value),
        FieldType::Date => format_date_value(value),
        FieldType::Number => format_number_value(value),
        FieldType::Text | FieldType::Signature | FieldType::Checkbox => plain_text(value),
    };
    FormattedValue::Text(text)
}

/// Whether a value should be treated as absent for required-field checks.
///
/// `false` is an answer, not a blank; empty strings and empty arrays are blank.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Interpret a value as a checkbox state.
pub fn is_checked(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let lowered = s.trim().to_ascii_lowercase();
            CHECKED_STRINGS.contains(&lowered.as_str())
        }
        _ => false,
    }
}

/// Lowercase a field name and drop everything but ASCII alphanumerics.
///
/// `"Buyer_Name 1"` and `"buyerName1"` both normalize to `"buyername1"`.
pub fn normalize_field_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Format a dollar amount: `$1,250,000` for whole amounts, `$1,250.50` otherwise.
///
/// Works from the decimal expansion of the `f64`, so amounts of any
/// magnitude keep their digits.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }
    let fixed = format!("{:.2}", amount.abs());
    let (dollars, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let nonzero = fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));
    let sign = if amount < 0.0 && nonzero { "-" } else { "" };
    let dollars = group_thousands(dollars);

    if cents == "00" {
        format!("{sign}${dollars}")
    } else {
        format!("{sign}${dollars}.{cents}")
    }
}

fn format_currency_value(value: &Value) -> String {
    match value {
        Value::Number(n) => n.as_f64().map(format_currency).unwrap_or_else(|| n.to_string()),
        Value::String(s) => match parse_amount(s) {
            Some(amount) => format_currency(amount),
            None => s.trim().to_string(),
        },
        other => plain_text(other),
    }
}

/// Parse a loosely formatted amount such as `"$1,250,000"` or `" 99.5 "`.
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn format_date_value(value: &Value) -> String {
    match value {
        Value::String(s) => parse_date(s)
            .map(|d| d.format(DATE_OUTPUT_FORMAT).to_string())
            .unwrap_or_else(|| s.trim().to_string()),
        other => plain_text(other),
    }
}

/// Parse a date from RFC 3339 or one of the accepted calendar formats.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn format_number_value(value: &Value) -> String {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 => format!("{f:.0}"),
                    _ => n.to_string(),
                }
            }
        }
        other => plain_text(other),
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Insert `,` between groups of three in a run of ASCII digits.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
