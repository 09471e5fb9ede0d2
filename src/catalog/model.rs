//! Inspection records and the request/response bodies of the catalog routes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One inspection of one restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub camis: String,
    pub dba: String,
    pub boro: Option<String>,
    pub building: Option<String>,
    pub street: Option<String>,
    pub zipcode: Option<String>,
    pub phone: Option<String>,
    pub cuisine_description: Option<String>,
    pub inspection_date: Option<NaiveDate>,
    pub action: Option<String>,
    pub violation_code: Option<String>,
    pub violation_description: Option<String>,
    pub critical_flag: Option<String>,
    pub score: Option<u32>,
    pub grade: Option<String>,
    pub inspection_type: Option<String>,
}

/// Body of `POST /api/restaurants/query`. Every field is optional.
///
/// `limit` is signed so that zero and negative values reach validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub borough: Option<String>,
    pub cuisine: Option<String>,
    pub min_grade: Option<String>,
    pub limit: Option<i64>,
}

/// Body of `POST /api/restaurants/details`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetailsRequest {
    pub restaurant_name: Option<String>,
    pub borough: Option<String>,
}

/// A search that passed validation and sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Upper-cased.
    pub borough: Option<String>,
    pub cuisine: Option<String>,
    pub min_grade: Option<String>,
    pub limit: usize,
}

/// A details lookup that passed validation and sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsQuery {
    pub restaurant_name: String,
    /// Upper-cased.
    pub borough: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub restaurants: Vec<Inspection>,
    pub count: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsResponse {
    pub restaurant_name: String,
    pub inspections: Vec<Inspection>,
    pub inspection_count: usize,
    pub message: String,
}
