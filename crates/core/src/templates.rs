//! Catalog of CAR form templates and HTML preview rendering.
//!
//! Each template names the PDF asset it fills, the fields that must be
//! present before a document can be finalized, the field placements used by
//! the PDF filler, and an HTML body with `{{ key }}` placeholders.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::forms::{format_value, FieldType, FormFieldMapping, FormattedValue};
use crate::types::FieldMap;

/// Rendered in place of a missing or blank value.
pub const BLANK_PLACEHOLDER: &str = "________";

const CHECKED_MARK: &str = "&#9746;";
const UNCHECKED_MARK: &str = "&#9744;";

/// Default height of a single-line field, in PDF points.
const LINE_HEIGHT: f32 = 14.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Broad document category, stored as the document `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    PurchaseAgreement,
    CounterOffer,
    Disclosure,
    Addendum,
}

/// A fillable form template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefinition {
    pub code: &'static str,
    pub name: &'static str,
    pub category: DocumentCategory,
    /// File name of the source PDF under the templates directory.
    pub pdf_file: &'static str,
    /// Number of pages used when a blank form has to be generated.
    pub page_count: u32,
    pub required_fields: Vec<&'static str>,
    pub mappings: Vec<FormFieldMapping>,
    #[serde(skip)]
    pub html: &'static str,
}

impl TemplateDefinition {
    /// The mapping that reads from the given data key, if any.
    pub fn mapping_for_key(&self, key: &str) -> Option<&FormFieldMapping> {
        self.mappings.iter().find(|m| m.data_key() == key)
    }

    /// Field kind for a data key; unmapped keys are plain text.
    pub fn field_type_for_key(&self, key: &str) -> FieldType {
        self.mapping_for_key(key)
            .map(|m| m.field_type)
            .unwrap_or(FieldType::Text)
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// All templates in catalog order.
pub fn list_templates() -> &'static [TemplateDefinition] {
    static CATALOG: OnceLock<Vec<TemplateDefinition>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

/// Case-insensitive lookup by template code (`"rpa"` finds `RPA`).
pub fn find_template(code: &str) -> Option<&'static TemplateDefinition> {
    let code = code.trim();
    list_templates()
        .iter()
        .find(|t| t.code.eq_ignore_ascii_case(code))
}

/// Required keys whose submitted values are missing or blank.
pub fn missing_required_fields(template: &TemplateDefinition, fields: &FieldMap) -> Vec<String> {
    template
        .required_fields
        .iter()
        .filter(|key| crate::forms::is_blank(fields.get(**key)))
        .map(|key| key.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// HTML rendering
// ---------------------------------------------------------------------------

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").expect("placeholder regex is valid")
    })
}

/// Render the template's HTML body with the given field values.
///
/// Values are formatted by the mapped field kind and HTML-escaped.
pub fn render_html(template: &TemplateDefinition, fields: &FieldMap) -> String {
    placeholder_regex()
        .replace_all(template.html, |caps: &regex::Captures<'_>| {
            let key = &caps[1];
            let field_type = template.field_type_for_key(key);
            let value = fields.get(key).cloned().unwrap_or(serde_json::Value::Null);
            match format_value(field_type, &value) {
                FormattedValue::Text(s) => html_escape::encode_text(&s).into_owned(),
                FormattedValue::Checked(true) => CHECKED_MARK.to_string(),
                FormattedValue::Checked(false) => UNCHECKED_MARK.to_string(),
                FormattedValue::Empty => BLANK_PLACEHOLDER.to_string(),
            }
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

fn field(
    name: &str,
    key: &str,
    field_type: FieldType,
    page: u32,
    x: f32,
    y: f32,
    width: f32,
) -> FormFieldMapping {
    FormFieldMapping::new(name, field_type, page, x, y, width, LINE_HEIGHT).with_key(key)
}

fn checkbox(name: &str, key: &str, page: u32, x: f32, y: f32) -> FormFieldMapping {
    FormFieldMapping::new(name, FieldType::Checkbox, page, x, y, 10.0, 10.0).with_key(key)
}

fn build_catalog() -> Vec<TemplateDefinition> {
    use FieldType::{Currency, Date, Number, Signature, Text};

    vec![
        TemplateDefinition {
            code: "RPA",
            name: "California Residential Purchase Agreement and Joint Escrow Instructions",
            category: DocumentCategory::PurchaseAgreement,
            pdf_file: "rpa.pdf",
            page_count: 2,
            required_fields: vec![
                "buyerName",
                "sellerName",
                "propertyAddress",
                "purchasePrice",
                "offerDate",
            ],
            mappings: vec![
                field("Date Prepared", "offerDate", Date, 1, 460.0, 740.0, 100.0),
                field("Buyer", "buyerName", Text, 1, 120.0, 700.0, 400.0),
                field("Seller", "sellerName", Text, 1, 120.0, 680.0, 400.0),
                field("Property Address", "propertyAddress", Text, 1, 160.0, 660.0, 300.0),
                field("City", "city", Text, 1, 470.0, 660.0, 100.0),
                field("County", "county", Text, 1, 120.0, 640.0, 150.0),
                field("Zip", "zipCode", Text, 1, 320.0, 640.0, 60.0),
                field("APN", "apn", Text, 1, 430.0, 640.0, 130.0),
                field("Purchase Price", "purchasePrice", Currency, 1, 180.0, 610.0, 150.0),
                field("Close Of Escrow Days", "closeOfEscrowDays", Number, 1, 180.0, 590.0, 40.0),
                field("Close Of Escrow Date", "closingDate", Date, 1, 300.0, 590.0, 100.0),
                checkbox("All Cash", "allCash", 1, 60.0, 560.0),
                checkbox("Conventional Loan", "conventionalLoan", 1, 160.0, 560.0),
                checkbox("FHA Loan", "fhaLoan", 1, 280.0, 560.0),
                checkbox("VA Loan", "vaLoan", 1, 360.0, 560.0),
                field("Initial Deposit", "initialDeposit", Currency, 1, 180.0, 530.0, 150.0),
                field("Loan Amount", "loanAmount", Currency, 1, 180.0, 510.0, 150.0),
                field("Down Payment", "downPayment", Currency, 1, 180.0, 490.0, 150.0),
                field("Buyer Agent", "buyerAgentName", Text, 1, 160.0, 440.0, 200.0),
                field("Buyer Brokerage", "buyerBrokerage", Text, 1, 380.0, 440.0, 180.0),
                field("Seller Agent", "sellerAgentName", Text, 1, 160.0, 420.0, 200.0),
                field("Seller Brokerage", "sellerBrokerage", Text, 1, 380.0, 420.0, 180.0),
                field("Offer Expiration", "offerExpiration", Date, 2, 200.0, 300.0, 100.0),
                field("Buyer Signature", "buyerSignature", Signature, 2, 80.0, 200.0, 220.0),
                field("Buyer Signature Date", "buyerSignatureDate", Date, 2, 330.0, 200.0, 100.0),
                field("Seller Signature", "sellerSignature", Signature, 2, 80.0, 150.0, 220.0),
                field("Seller Signature Date", "sellerSignatureDate", Date, 2, 330.0, 150.0, 100.0),
            ],
            html: RPA_HTML,
        },
        TemplateDefinition {
            code: "CO",
            name: "Counter Offer",
            category: DocumentCategory::CounterOffer,
            pdf_file: "co.pdf",
            page_count: 1,
            required_fields: vec![
                "counterOfferNumber",
                "propertyAddress",
                "originalOfferDate",
                "buyerName",
                "sellerName",
            ],
            mappings: vec![
                field("Counter Offer No", "counterOfferNumber", Number, 1, 200.0, 740.0, 40.0),
                field("Offer Date", "originalOfferDate", Date, 1, 420.0, 720.0, 100.0),
                field("Property Address", "propertyAddress", Text, 1, 160.0, 700.0, 360.0),
                field("Buyer", "buyerName", Text, 1, 120.0, 680.0, 400.0),
                field("Seller", "sellerName", Text, 1, 120.0, 660.0, 400.0),
                field("Purchase Price", "purchasePrice", Currency, 1, 200.0, 620.0, 150.0),
                field("Close Of Escrow Days", "closeOfEscrowDays", Number, 1, 200.0, 600.0, 40.0),
                field("Other Terms", "otherTerms", Text, 1, 60.0, 560.0, 500.0),
                field("Expiration Date", "expirationDate", Date, 1, 220.0, 400.0, 100.0),
                field("Seller Signature", "sellerSignature", Signature, 1, 80.0, 200.0, 220.0),
                field("Seller Signature Date", "sellerSignatureDate", Date, 1, 330.0, 200.0, 100.0),
            ],
            html: CO_HTML,
        },
        TemplateDefinition {
            code: "BCO",
            name: "Buyer Counter Offer",
            category: DocumentCategory::CounterOffer,
            pdf_file: "bco.pdf",
            page_count: 1,
            required_fields: vec![
                "counterOfferNumber",
                "propertyAddress",
                "sellerCounterDate",
                "buyerName",
            ],
            mappings: vec![
                field("Buyer Counter Offer No", "counterOfferNumber", Number, 1, 220.0, 740.0, 40.0),
                field("Seller Counter Date", "sellerCounterDate", Date, 1, 420.0, 720.0, 100.0),
                field("Property Address", "propertyAddress", Text, 1, 160.0, 700.0, 360.0),
                field("Buyer", "buyerName", Text, 1, 120.0, 680.0, 400.0),
                field("Seller", "sellerName", Text, 1, 120.0, 660.0, 400.0),
                field("Purchase Price", "purchasePrice", Currency, 1, 200.0, 620.0, 150.0),
                field("Other Terms", "otherTerms", Text, 1, 60.0, 580.0, 500.0),
                field("Expiration Date", "expirationDate", Date, 1, 220.0, 400.0, 100.0),
                field("Buyer Signature", "buyerSignature", Signature, 1, 80.0, 200.0, 220.0),
                field("Buyer Signature Date", "buyerSignatureDate", Date, 1, 330.0, 200.0, 100.0),
            ],
            html: BCO_HTML,
        },
        TemplateDefinition {
            code: "AD",
            name: "Disclosure Regarding Real Estate Agency Relationship",
            category: DocumentCategory::Disclosure,
            pdf_file: "ad.pdf",
            page_count: 1,
            required_fields: vec!["clientName", "agentName", "brokerage", "disclosureDate"],
            mappings: vec![
                field("Client Name", "clientName", Text, 1, 140.0, 300.0, 250.0),
                field("Property Address", "propertyAddress", Text, 1, 160.0, 280.0, 360.0),
                checkbox("Buyer", "representsBuyer", 1, 60.0, 250.0),
                checkbox("Seller", "representsSeller", 1, 160.0, 250.0),
                checkbox("Dual Agent", "dualAgency", 1, 260.0, 250.0),
                field("Agent Name", "agentName", Text, 1, 140.0, 220.0, 200.0),
                field("Brokerage", "brokerage", Text, 1, 360.0, 220.0, 200.0),
                field("DRE License", "dreLicense", Text, 1, 140.0, 200.0, 120.0),
                field("Date", "disclosureDate", Date, 1, 360.0, 200.0, 100.0),
                field("Client Signature", "clientSignature", Signature, 1, 80.0, 150.0, 220.0),
            ],
            html: AD_HTML,
        },
        TemplateDefinition {
            code: "TDS",
            name: "Real Estate Transfer Disclosure Statement",
            category: DocumentCategory::Disclosure,
            pdf_file: "tds.pdf",
            page_count: 2,
            required_fields: vec!["propertyAddress", "city", "county", "sellerName"],
            mappings: vec![
                field("Property Address", "propertyAddress", Text, 1, 160.0, 720.0, 300.0),
                field("City", "city", Text, 1, 470.0, 720.0, 100.0),
                field("County", "county", Text, 1, 120.0, 700.0, 150.0),
                field("Seller", "sellerName", Text, 1, 120.0, 680.0, 400.0),
                checkbox("Seller Occupying", "sellerOccupying", 1, 60.0, 650.0),
                checkbox("Range", "hasRange", 1, 60.0, 620.0),
                checkbox("Dishwasher", "hasDishwasher", 1, 160.0, 620.0),
                checkbox("Smoke Detector", "hasSmokeDetector", 1, 260.0, 620.0),
                checkbox("Pool", "hasPool", 1, 360.0, 620.0),
                checkbox("Known Defects", "knownDefects", 1, 60.0, 580.0),
                field("Defects Explanation", "defectsExplanation", Text, 1, 60.0, 560.0, 500.0),
                field("Seller Signature", "sellerSignature", Signature, 2, 80.0, 200.0, 220.0),
                field("Seller Signature Date", "sellerSignatureDate", Date, 2, 330.0, 200.0, 100.0),
            ],
            html: TDS_HTML,
        },
        TemplateDefinition {
            code: "SPQ",
            name: "Seller Property Questionnaire",
            category: DocumentCategory::Disclosure,
            pdf_file: "spq.pdf",
            page_count: 1,
            required_fields: vec!["propertyAddress", "sellerName"],
            mappings: vec![
                field("Property Address", "propertyAddress", Text, 1, 160.0, 720.0, 360.0),
                field("Seller", "sellerName", Text, 1, 120.0, 700.0, 400.0),
                checkbox("Death On Property", "deathOnProperty", 1, 60.0, 660.0),
                checkbox("Lawsuits", "pendingLawsuits", 1, 60.0, 640.0),
                checkbox("Flooding", "floodingOrDrainage", 1, 60.0, 620.0),
                checkbox("Neighborhood Noise", "neighborhoodNoise", 1, 60.0, 600.0),
                field("Explanation", "explanation", Text, 1, 60.0, 560.0, 500.0),
                field("Seller Signature", "sellerSignature", Signature, 1, 80.0, 200.0, 220.0),
                field("Date", "signatureDate", Date, 1, 330.0, 200.0, 100.0),
            ],
            html: SPQ_HTML,
        },
    ]
}

const RPA_HTML: &str = r#"<article class="car-form rpa">
<h1>California Residential Purchase Agreement and Joint Escrow Instructions</h1>
<p>Date prepared: {{ offerDate }}</p>
<h2>1. Offer</h2>
<p>This is an offer from {{ buyerName }} ("Buyer") to purchase the real property described as
{{ propertyAddress }}, {{ city }}, County of {{ county }}, California {{ zipCode }},
Assessor's Parcel No. {{ apn }} ("Property"), owned by {{ sellerName }} ("Seller").</p>
<p>The purchase price offered is {{ purchasePrice }}.</p>
<p>Close of escrow shall occur {{ closeOfEscrowDays }} days after acceptance or on {{ closingDate }}.</p>
<h2>2. Finance Terms</h2>
<ul>
<li>{{ allCash }} All cash offer</li>
<li>{{ conventionalLoan }} Conventional financing</li>
<li>{{ fhaLoan }} FHA financing</li>
<li>{{ vaLoan }} VA financing</li>
</ul>
<p>Initial deposit: {{ initialDeposit }}. Loan amount: {{ loanAmount }}. Down payment: {{ downPayment }}.</p>
<h2>3. Agency</h2>
<p>Buyer's agent: {{ buyerAgentName }} of {{ buyerBrokerage }}.</p>
<p>Seller's agent: {{ sellerAgentName }} of {{ sellerBrokerage }}.</p>
<h2>4. Expiration of Offer</h2>
<p>This offer shall be deemed revoked unless accepted by {{ offerExpiration }}.</p>
<div class="signatures">
<p>Buyer: {{ buyerSignature }} Date: {{ buyerSignatureDate }}</p>
<p>Seller: {{ sellerSignature }} Date: {{ sellerSignatureDate }}</p>
</div>
</article>"#;

const CO_HTML: &str = r#"<article class="car-form co">
<h1>Counter Offer No. {{ counterOfferNumber }}</h1>
<p>This is a counter offer to the purchase agreement dated {{ originalOfferDate }} on property known as
{{ propertyAddress }} between {{ buyerName }} ("Buyer") and {{ sellerName }} ("Seller").</p>
<h2>Terms</h2>
<p>Purchase price: {{ purchasePrice }}.</p>
<p>Close of escrow: {{ closeOfEscrowDays }} days after acceptance.</p>
<p>Other terms: {{ otherTerms }}</p>
<h2>Expiration</h2>
<p>This counter offer shall be deemed revoked unless accepted by {{ expirationDate }}.</p>
<div class="signatures">
<p>Seller: {{ sellerSignature }} Date: {{ sellerSignatureDate }}</p>
</div>
</article>"#;

const BCO_HTML: &str = r#"<article class="car-form bco">
<h1>Buyer Counter Offer No. {{ counterOfferNumber }}</h1>
<p>This is a counter offer to the seller counter offer dated {{ sellerCounterDate }} on property known as
{{ propertyAddress }} between {{ buyerName }} ("Buyer") and {{ sellerName }} ("Seller").</p>
<h2>Terms</h2>
<p>Purchase price: {{ purchasePrice }}.</p>
<p>Other terms: {{ otherTerms }}</p>
<h2>Expiration</h2>
<p>This counter offer shall be deemed revoked unless accepted by {{ expirationDate }}.</p>
<div class="signatures">
<p>Buyer: {{ buyerSignature }} Date: {{ buyerSignatureDate }}</p>
</div>
</article>"#;

const AD_HTML: &str = r#"<article class="car-form ad">
<h1>Disclosure Regarding Real Estate Agency Relationship</h1>
<p>Client: {{ clientName }}</p>
<p>Property: {{ propertyAddress }}</p>
<h2>Agency</h2>
<ul>
<li>{{ representsBuyer }} The agent represents the Buyer exclusively</li>
<li>{{ representsSeller }} The agent represents the Seller exclusively</li>
<li>{{ dualAgency }} The agent represents both Buyer and Seller (dual agency)</li>
</ul>
<p>Agent: {{ agentName }}, DRE Lic. {{ dreLicense }}, of {{ brokerage }}.</p>
<div class="signatures">
<p>Client: {{ clientSignature }} Date: {{ disclosureDate }}</p>
</div>
</article>"#;

const TDS_HTML: &str = r#"<article class="car-form tds">
<h1>Real Estate Transfer Disclosure Statement</h1>
<p>This disclosure statement concerns the real property situated in the City of {{ city }},
County of {{ county }}, State of California, described as {{ propertyAddress }}.</p>
<p>Seller: {{ sellerName }}</p>
<p>{{ sellerOccupying }} Seller is occupying the property.</p>
<h2>Items on the Property</h2>
<ul>
<li>{{ hasRange }} Range</li>
<li>{{ hasDishwasher }} Dishwasher</li>
<li>{{ hasSmokeDetector }} Smoke detector(s)</li>
<li>{{ hasPool }} Pool</li>
</ul>
<h2>Defects</h2>
<p>{{ knownDefects }} Seller is aware of significant defects or malfunctions.</p>
<p>{{ defectsExplanation }}</p>
<div class="signatures">
<p>Seller: {{ sellerSignature }} Date: {{ sellerSignatureDate }}</p>
</div>
</article>"#;

const SPQ_HTML: &str = r#"<article class="car-form spq">
<h1>Seller Property Questionnaire</h1>
<p>Property: {{ propertyAddress }}</p>
<p>Seller: {{ sellerName }}</p>
<h2>Disclosures</h2>
<ul>
<li>{{ deathOnProperty }} Any death on the property within the last three years</li>
<li>{{ pendingLawsuits }} Any pending or threatened lawsuits affecting the property</li>
<li>{{ floodingOrDrainage }} Any flooding, drainage, or grading problems</li>
<li>{{ neighborhoodNoise }} Any neighborhood noise, nuisance, or other problems</li>
</ul>
<p>Explanation: {{ explanation }}</p>
<div class="signatures">
<p>Seller: {{ sellerSignature }} Date: {{ signatureDate }}</p>
</div>
</article>"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
