//! Demo property catalog and search.
//!
//! The catalog is a fixed JSON array compiled into the binary. Search is a
//! linear filter over that array followed by a stable sort and a page slice.

use std::cmp::Ordering;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of search results per page.
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Maximum number of search results per page.
pub const MAX_SEARCH_LIMIT: i64 = 100;

const DEMO_PROPERTIES_JSON: &str = include_str!("../data/properties.json");

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub mls_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    /// List price in whole dollars.
    pub price: u64,
    pub bedrooms: u32,
    pub bathrooms: f32,
    pub square_feet: u32,
    pub lot_size: Option<u32>,
    pub year_built: Option<u32>,
    pub property_type: String,
    pub status: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub listing_agent: String,
    /// ISO `YYYY-MM-DD`.
    pub listed_date: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Property {
    /// Single-line address used to prefill document fields.
    pub fn full_address(&self) -> String {
        format!("{}, {}, {} {}", self.address, self.city, self.state, self.zip_code)
    }

    fn matches_query(&self, needle: &str) -> bool {
        [
            &self.address,
            &self.city,
            &self.zip_code,
            &self.mls_number,
            &self.description,
        ]
        .iter()
        .any(|haystack| haystack.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Price,
    Bedrooms,
    SquareFeet,
    ListedDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query parameters for `GET /properties/search`. Every filter is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySearchParams {
    /// Case-insensitive substring over address, city, zip, MLS number, description.
    pub query: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    #[serde(alias = "bedrooms")]
    pub min_bedrooms: Option<u32>,
    #[serde(alias = "bathrooms")]
    pub min_bathrooms: Option<f32>,
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One page of search results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Matches before paging.
    pub total: usize,
    pub limit: i64,
    pub offset: i64,
    pub results: Vec<Property>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The embedded demo catalog, parsed on first use.
pub fn demo_properties() -> &'static [Property] {
    static CATALOG: OnceLock<Vec<Property>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        serde_json::from_str(DEMO_PROPERTIES_JSON).expect("embedded property catalog is valid JSON")
    })
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Filter, sort, and page `properties`.
pub fn search(properties: &[Property], params: &PropertySearchParams) -> Result<SearchPage, CoreError> {
    if let (Some(min), Some(max)) = (params.min_price, params.max_price) {
        if min > max {
            return Err(CoreError::Validation(format!(
                "minPrice ({min}) must not exceed maxPrice ({max})"
            )));
        }
    }

    let needle = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let mut matches: Vec<&Property> = properties
        .iter()
        .filter(|p| needle.as_deref().map_or(true, |n| p.matches_query(n)))
        .filter(|p| eq_filter(params.city.as_deref(), &p.city))
        .filter(|p| params.min_price.map_or(true, |min| p.price >= min))
        .filter(|p| params.max_price.map_or(true, |max| p.price <= max))
        .filter(|p| params.min_bedrooms.map_or(true, |min| p.bedrooms >= min))
        .filter(|p| params.min_bathrooms.map_or(true, |min| p.bathrooms >= min))
        .filter(|p| eq_filter(params.property_type.as_deref(), &p.property_type))
        .filter(|p| eq_filter(params.status.as_deref(), &p.status))
        .collect();

    if let Some(field) = params.sort_by {
        let order = params.sort_order.unwrap_or_default();
        matches.sort_by(|a, b| {
            let ord = compare_by(field, a, b);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }

    let limit = clamp_limit(params.limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT);
    let offset = clamp_offset(params.offset);
    let total = matches.len();

    let results = matches
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect();

    Ok(SearchPage {
        total,
        limit,
        offset,
        results,
    })
}

/// Case-insensitive equality; an absent or blank filter matches everything.
fn eq_filter(filter: Option<&str>, value: &str) -> bool {
    match filter.map(str::trim) {
        None | Some("") => true,
        Some(f) => f.eq_ignore_ascii_case(value),
    }
}

fn compare_by(field: SortField, a: &Property, b: &Property) -> Ordering {
    match field {
        SortField::Price => a.price.cmp(&b.price),
        SortField::Bedrooms => a.bedrooms.cmp(&b.bedrooms),
        SortField::SquareFeet => a.square_feet.cmp(&b.square_feet),
        SortField::ListedDate => a.listed_date.cmp(&b.listed_date),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn run(params: PropertySearchParams) -> SearchPage {
        search(demo_properties(), &params).expect("search should succeed")
    }

    fn ids(page: &SearchPage) -> Vec<&str> {
        page.results.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn catalog_parses_with_unique_ids() {
        let props = demo_properties();
        assert!(props.len() >= 8);
        let mut ids: Vec<_> = props.iter().map(|p| &p.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), props.len());
    }

    #[test]
    fn no_filters_returns_everything_in_catalog_order() {
        let page = run(PropertySearchParams::default());
        assert_eq!(page.total, demo_properties().len());
        assert_eq!(page.results.first().map(|p| p.id.as_str()), Some("prop-001"));
    }

    #[test]
    fn query_matches_city_and_mls_case_insensitively() {
        let page = run(PropertySearchParams {
            query: Some("oakLAND".into()),
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["prop-006"]);

        let page = run(PropertySearchParams {
            query: Some("ml81945210".into()),
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["prop-001"]);
    }

    #[test]
    fn price_and_bedroom_filters_combine() {
        let page = run(PropertySearchParams {
            min_price: Some(1_000_000),
            max_price: Some(2_000_000),
            min_bedrooms: Some(4),
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["prop-003", "prop-006"]);
    }

    #[test]
    fn status_and_type_filters() {
        let page = run(PropertySearchParams {
            property_type: Some("condo".into()),
            status: Some("ACTIVE".into()),
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["prop-002", "prop-008"]);
    }

    #[test]
    fn sort_by_price_descending() {
        let page = run(PropertySearchParams {
            sort_by: Some(SortField::Price),
            sort_order: Some(SortOrder::Desc),
            limit: Some(3),
            ..Default::default()
        });
        assert_eq!(ids(&page), vec!["prop-007", "prop-004", "prop-003"]);
        assert_eq!(page.total, demo_properties().len());
    }

    #[test]
    fn paging_clamps_bounds() {
        let page = run(PropertySearchParams {
            limit: Some(0),
            offset: Some(-5),
            ..Default::default()
        });
        assert_eq!(page.limit, 1);
        assert_eq!(page.offset, 0);
        assert_eq!(page.results.len(), 1);

        let page = run(PropertySearchParams {
            offset: Some(100),
            ..Default::default()
        });
        assert!(page.results.is_empty());
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let result = search(
            demo_properties(),
            &PropertySearchParams {
                min_price: Some(2_000_000),
                max_price: Some(1_000_000),
                ..Default::default()
            },
        );
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn full_address_joins_parts() {
        let p = &demo_properties()[0];
        assert_eq!(p.full_address(), "1234 Sunset Boulevard, Los Angeles, CA 90026");
    }
}
