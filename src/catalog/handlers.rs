//! Route handlers for the inspection catalog.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{Method, Uri};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::catalog::model::{DetailsRequest, DetailsResponse, SearchRequest, SearchResponse};
use crate::catalog::service::Catalog;
use crate::catalog::validation;
use crate::error::ApiError;

pub const HEALTH_MESSAGE: &str = "NYC Restaurants API is running";

/// Catalog routes, with the catalog already bound as state.
pub fn routes(catalog: Arc<Catalog>) -> Router {
    Router::new()
        .route("/api/restaurants/query", post(search))
        .route("/api/restaurants/details", post(details))
        .route("/api/restaurants/boroughs", get(boroughs))
        .route("/api/restaurants/cuisines", get(cuisines))
        .route("/api/restaurants/health", get(health))
        .route("/actuator/health", get(actuator_health))
        .with_state(catalog)
}

async fn search(
    State(catalog): State<Arc<Catalog>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = payload?;
    let query = validation::validate_search(request)?;
    tracing::info!(
        borough = ?query.borough,
        cuisine = ?query.cuisine,
        min_grade = ?query.min_grade,
        limit = query.limit,
        "Searching restaurants"
    );
    Ok(Json(catalog.search(&query)))
}

async fn details(
    State(catalog): State<Arc<Catalog>>,
    payload: Result<Json<DetailsRequest>, JsonRejection>,
) -> Result<Json<DetailsResponse>, ApiError> {
    let Json(request) = payload?;
    let query = validation::validate_details(request)?;
    tracing::info!(
        restaurant = %query.restaurant_name,
        borough = ?query.borough,
        "Fetching restaurant details"
    );
    Ok(Json(catalog.details(&query)))
}

async fn boroughs(State(catalog): State<Arc<Catalog>>) -> Json<Vec<String>> {
    Json(catalog.boroughs())
}

async fn cuisines(State(catalog): State<Arc<Catalog>>) -> Json<Vec<String>> {
    Json(catalog.cuisines())
}

async fn health() -> &'static str {
    HEALTH_MESSAGE
}

async fn actuator_health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}

/// Router fallback for unknown paths.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Route {}", uri.path()))
}

/// Router fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}
