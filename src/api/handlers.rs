//! Route handlers
//!
//! Each handler resolves the dataset through the shared store, so the first
//! request on a cold start waits for (or joins) the initial build.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use super::{ApiError, AppState, ROUTES};
use crate::data::Dataset;
use crate::query::{self, QueryParams, QueryResult};

/// Dataset summary attached to query responses
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DatasetSummary<'a> {
    total_pokemon: usize,
    fetched_at: DateTime<Utc>,
    source: &'a str,
}

impl<'a> DatasetSummary<'a> {
    fn of(dataset: &'a Dataset) -> Self {
        Self {
            total_pokemon: dataset.len(),
            fetched_at: dataset.fetched_at(),
            source: dataset.source(),
        }
    }
}

#[derive(Serialize)]
struct QueryResponse<'a> {
    #[serde(flatten)]
    result: QueryResult<'a>,
    dataset: DatasetSummary<'a>,
}

#[derive(Serialize)]
struct TypeCount<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    count: usize,
}

#[derive(Serialize)]
struct RegionCount<'a> {
    region: &'a str,
    count: usize,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Result<Response, ApiError> {
    let dataset = state.store.get_or_build().await?;

    Ok(Json(json!({
        "ok": true,
        "status": "online",
        "service": "pokedex-api",
        "totalPokemon": dataset.len(),
        "fetchedAt": dataset.fetched_at(),
        "source": dataset.source(),
        "cacheTtlHours": state.store.cache_ttl_hours(),
    }))
    .into_response())
}

/// GET /api/types
pub async fn types(State(state): State<AppState>) -> Result<Response, ApiError> {
    let dataset = state.store.get_or_build().await?;

    let items: Vec<TypeCount<'_>> = dataset
        .type_counts()
        .iter()
        .map(|(kind, count)| TypeCount { kind, count: *count })
        .collect();

    Ok(Json(json!({ "total": items.len(), "items": items })).into_response())
}

/// GET /api/regions
pub async fn regions(State(state): State<AppState>) -> Result<Response, ApiError> {
    let dataset = state.store.get_or_build().await?;

    let items: Vec<RegionCount<'_>> = dataset
        .region_counts()
        .iter()
        .map(|(region, count)| RegionCount { region, count: *count })
        .collect();

    Ok(Json(json!({ "total": items.len(), "items": items })).into_response())
}

/// GET /api/pokemon
pub async fn list_pokemon(
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let params = QueryParams::from_query(&raw);
    let dataset = state.store.get_or_build().await?;

    let response = QueryResponse {
        result: query::query(&dataset, &params),
        dataset: DatasetSummary::of(&dataset),
    };
    Ok(Json(response).into_response())
}

/// GET /api/pokemon/:identifier
pub async fn get_pokemon(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Response, ApiError> {
    let dataset = state.store.get_or_build().await?;

    let item = query::lookup(&dataset, &identifier).ok_or(ApiError::NotFound)?;
    Ok(Json(json!({ "item": item })).into_response())
}

/// POST /api/refresh
pub async fn refresh(State(state): State<AppState>) -> Result<Response, ApiError> {
    let dataset = state.store.force_build().await?;

    Ok(Json(json!({
        "ok": true,
        "message": "Dataset refreshed successfully.",
        "totalPokemon": dataset.len(),
        "fetchedAt": dataset.fetched_at(),
    }))
    .into_response())
}

/// Any unmatched path or method
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found.", "routes": ROUTES })),
    )
}
