use serde::{Deserialize, Serialize};

use crate::models::taxonomymodel::LocationCategory;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPointDto {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LocationFilterDto {
    pub name: String,
    pub category: LocationCategory,
}

/// One criterion object of a search request. Callers send an ordered list of
/// these; every present field becomes exactly one predicate. Unknown keys are
/// rejected at deserialization instead of being silently dropped.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchFilterDto {
    pub ad_type: Option<String>,
    pub ad_subtype: Option<String>,
    pub property_type: Option<Vec<String>>,
    pub property_subtype: Option<String>,
    pub announcement_code: Option<String>,

    // Minimum counts matched against the metadata list.
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub parking_spaces: Option<i32>,
    pub floors: Option<i32>,
    pub suites: Option<i32>,

    // Price bounds arrive as strings and are parsed as integer cents.
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_condominium: Option<String>,
    pub max_condominium: Option<String>,

    pub geolocation: Option<GeoPointDto>,
    pub tags: Option<Vec<String>>,
    pub location_filter: Option<Vec<LocationFilterDto>>,
    pub min_size: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Views,
    CreatedAt,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Views => "views",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query-string half of a search request. `page` is 0-based; the response
/// page number is 1-based.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryDto {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// When set, the response also carries total count and total pages.
    /// Count queries are expensive, so this is opt-in.
    pub count: Option<bool>,
    pub sort_by: Option<SortField>,
    pub order: Option<SortOrder>,
}
