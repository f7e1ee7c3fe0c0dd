// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shared handler implementations used across API versions.
//!
//! Version modules wrap these with their OpenAPI annotations. The public
//! resolution handlers live here too: they are unversioned and answer with
//! the `{"error": ...}` body shape the resolvers produce.

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use log::{debug, warn};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use super::error::ErrorResponse;
use super::responses::{
    ApiResponse, ApiSummary, ApiVersionsResponse, FeedSummary, HealthResponse,
};
use crate::api::version::{ApiVersion, API_CURRENT_VERSION};
use crate::catalog::{DefinitionCatalog, DefinitionLookup};
use crate::hits::{spawn_record, AnalyticsReport, HitRecord, HitRecorder};
use crate::provider_client::{ProbeReport, ProviderClient};
use crate::resolver::{error_payload, ApiResolver, FeedResolver};

const UNKNOWN: &str = "unknown";

/// Everything the public resolution routes need, shared as one extension.
#[derive(Clone)]
pub struct ResolutionContext {
    pub definitions: Arc<dyn DefinitionLookup>,
    pub hits: Arc<dyn HitRecorder>,
    pub api_resolver: Arc<ApiResolver>,
    pub feed_resolver: Arc<FeedResolver>,
}

fn header_or_unknown(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

fn hit_from_headers(headers: &HeaderMap) -> HitRecord {
    HitRecord::now(
        header_or_unknown(headers, "x-forwarded-for"),
        header_or_unknown(headers, "user-agent"),
    )
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(error_payload(message))).into_response()
}

/// Serve a virtual API endpoint.
pub async fn resolve_api(
    Extension(ctx): Extension<ResolutionContext>,
    Path((property, route)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let Some(endpoint) = ctx.definitions.find_endpoint(&property, &route).await else {
        debug!("No API at {property}/{route}");
        return error_body(StatusCode::NOT_FOUND, "API not found");
    };

    spawn_record(ctx.hits.clone(), endpoint.id.clone(), hit_from_headers(&headers));

    match ctx.api_resolver.resolve(&endpoint).await {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(err) => error_body(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

/// Serve a page of a feed.
pub async fn resolve_feed(
    Extension(ctx): Extension<ResolutionContext>,
    Path((property, route)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let Some(feed) = ctx.definitions.find_feed(&property, &route).await else {
        debug!("No active feed at {property}/{route}");
        return error_body(StatusCode::NOT_FOUND, "Feed not found");
    };

    let payload = ctx.feed_resolver.resolve(&feed, &query).await;
    match payload.get("error") {
        Some(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": error })),
        )
            .into_response(),
        None => (StatusCode::OK, Json(payload)).into_response(),
    }
}

/// List available API versions
pub async fn list_api_versions() -> Json<ApiVersionsResponse> {
    Json(ApiVersionsResponse {
        versions: ApiVersion::all_strings(),
        current: API_CURRENT_VERSION.to_string(),
    })
}

/// Check server health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now(),
    })
}

pub async fn list_apis(
    Extension(catalog): Extension<DefinitionCatalog>,
) -> Json<ApiResponse<Vec<ApiSummary>>> {
    let summaries = catalog
        .list_endpoints()
        .await
        .iter()
        .map(ApiSummary::from)
        .collect();
    Json(ApiResponse::success(summaries))
}

pub async fn get_api(
    Extension(catalog): Extension<DefinitionCatalog>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ApiSummary>>, ErrorResponse> {
    let endpoint = catalog
        .get_endpoint(&id)
        .await
        .ok_or_else(|| ErrorResponse::not_found("api", &id))?;
    Ok(Json(ApiResponse::success(ApiSummary::from(&endpoint))))
}

pub async fn list_properties(
    Extension(catalog): Extension<DefinitionCatalog>,
) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::success(catalog.list_properties().await))
}

pub async fn list_feeds(
    Extension(catalog): Extension<DefinitionCatalog>,
) -> Json<ApiResponse<Vec<FeedSummary>>> {
    let summaries = catalog
        .list_feeds()
        .await
        .iter()
        .map(FeedSummary::from)
        .collect();
    Json(ApiResponse::success(summaries))
}

pub async fn get_feed(
    Extension(catalog): Extension<DefinitionCatalog>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FeedSummary>>, ErrorResponse> {
    let feed = catalog
        .get_feed(&id)
        .await
        .ok_or_else(|| ErrorResponse::not_found("feed", &id))?;
    Ok(Json(ApiResponse::success(FeedSummary::from(&feed))))
}

pub async fn get_analytics(
    Extension(catalog): Extension<DefinitionCatalog>,
) -> Json<ApiResponse<AnalyticsReport>> {
    Json(ApiResponse::success(
        catalog.analytics(chrono::Utc::now()).await,
    ))
}

/// Call a provider once and report how it answered.
pub async fn test_provider(
    Extension(catalog): Extension<DefinitionCatalog>,
    Extension(client): Extension<Arc<dyn ProviderClient>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ProbeReport>>, ErrorResponse> {
    let provider = catalog
        .find_provider(&id)
        .await
        .ok_or_else(|| ErrorResponse::not_found("provider", &id))?;

    let report = client.probe(&provider).await;
    if !report.success {
        warn!(
            "Provider '{id}' test failed: {} {}",
            report.status, report.status_text
        );
    }
    Ok(Json(ApiResponse::success(report)))
}
