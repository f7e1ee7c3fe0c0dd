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

//! API v1 handler functions with OpenAPI documentation.
//!
//! These wrap the shared handler implementations with v1 path annotations.

use axum::{
    extract::{Extension, Path, Query},
    http::HeaderMap,
    response::{Json, Response},
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::shared::handlers::{self as shared, ResolutionContext};
use crate::api::shared::{
    ApiResponse, ApiSummary, ApiVersionsResponse, ErrorResponse, FeedSummary, HealthResponse,
    ResolutionErrorBody,
};
use crate::catalog::DefinitionCatalog;
use crate::hits::AnalyticsReport;
use crate::provider_client::{ProbeReport, ProviderClient};

/// List available API versions
#[utoipa::path(
    get,
    path = "/api/versions",
    responses(
        (status = 200, description = "List of available API versions", body = ApiVersionsResponse),
    ),
    tag = "API"
)]
pub async fn list_api_versions() -> Json<ApiVersionsResponse> {
    shared::list_api_versions().await
}

/// Check server health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    shared::health_check().await
}

/// Resolve a virtual API endpoint
#[utoipa::path(
    get,
    path = "/api/{property}/{route}",
    params(
        ("property" = String, Path, description = "Property the endpoint belongs to"),
        ("route" = String, Path, description = "Endpoint route within the property"),
    ),
    responses(
        (status = 200, description = "Resolved payload, or an `error` payload for misconfigured endpoints"),
        (status = 404, description = "No endpoint at this route", body = ResolutionErrorBody),
        (status = 500, description = "Upstream provider or database failure", body = ResolutionErrorBody),
    ),
    tag = "Resolution"
)]
pub async fn resolve_api(
    ctx: Extension<ResolutionContext>,
    path: Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    shared::resolve_api(ctx, path, headers).await
}

/// Resolve a page of a feed
#[utoipa::path(
    get,
    path = "/api/feed/{property}/{route}",
    params(
        ("property" = String, Path, description = "Property the feed belongs to"),
        ("route" = String, Path, description = "Feed route within the property"),
    ),
    responses(
        (status = 200, description = "Feed page"),
        (status = 404, description = "No active feed at this route", body = ResolutionErrorBody),
        (status = 500, description = "Feed resolution failed", body = ResolutionErrorBody),
    ),
    tag = "Resolution"
)]
pub async fn resolve_feed(
    ctx: Extension<ResolutionContext>,
    path: Path<(String, String)>,
    query: Query<HashMap<String, String>>,
) -> Response {
    shared::resolve_feed(ctx, path, query).await
}

/// List configured API endpoints
#[utoipa::path(
    get,
    path = "/api/v1/apis",
    responses(
        (status = 200, description = "API endpoint summaries", body = ApiResponse),
    ),
    tag = "Apis"
)]
pub async fn list_apis(
    catalog: Extension<DefinitionCatalog>,
) -> Json<ApiResponse<Vec<ApiSummary>>> {
    shared::list_apis(catalog).await
}

/// Get one API endpoint by id
#[utoipa::path(
    get,
    path = "/api/v1/apis/{id}",
    params(
        ("id" = String, Path, description = "API endpoint id"),
    ),
    responses(
        (status = 200, description = "API endpoint summary", body = ApiResponse),
        (status = 404, description = "API endpoint not found", body = ErrorResponse),
    ),
    tag = "Apis"
)]
pub async fn get_api(
    catalog: Extension<DefinitionCatalog>,
    id: Path<String>,
) -> Result<Json<ApiResponse<ApiSummary>>, ErrorResponse> {
    shared::get_api(catalog, id).await
}

/// List the distinct properties endpoints are grouped under
#[utoipa::path(
    get,
    path = "/api/v1/properties",
    responses(
        (status = 200, description = "Sorted property names", body = ApiResponse),
    ),
    tag = "Apis"
)]
pub async fn list_properties(
    catalog: Extension<DefinitionCatalog>,
) -> Json<ApiResponse<Vec<String>>> {
    shared::list_properties(catalog).await
}

/// List configured feeds
#[utoipa::path(
    get,
    path = "/api/v1/feeds",
    responses(
        (status = 200, description = "Feed summaries", body = ApiResponse),
    ),
    tag = "Feeds"
)]
pub async fn list_feeds(
    catalog: Extension<DefinitionCatalog>,
) -> Json<ApiResponse<Vec<FeedSummary>>> {
    shared::list_feeds(catalog).await
}

/// Get one feed by id
#[utoipa::path(
    get,
    path = "/api/v1/feeds/{id}",
    params(
        ("id" = String, Path, description = "Feed id"),
    ),
    responses(
        (status = 200, description = "Feed summary, active or not", body = ApiResponse),
        (status = 404, description = "Feed not found", body = ErrorResponse),
    ),
    tag = "Feeds"
)]
pub async fn get_feed(
    catalog: Extension<DefinitionCatalog>,
    id: Path<String>,
) -> Result<Json<ApiResponse<FeedSummary>>, ErrorResponse> {
    shared::get_feed(catalog, id).await
}

/// Hit analytics across all endpoints
#[utoipa::path(
    get,
    path = "/api/v1/analytics",
    responses(
        (status = 200, description = "Hit totals and trends", body = ApiResponse),
    ),
    tag = "Analytics"
)]
pub async fn get_analytics(
    catalog: Extension<DefinitionCatalog>,
) -> Json<ApiResponse<AnalyticsReport>> {
    shared::get_analytics(catalog).await
}

/// Test connectivity to a provider
#[utoipa::path(
    post,
    path = "/api/v1/providers/{id}/test",
    params(
        ("id" = String, Path, description = "Provider id"),
    ),
    responses(
        (status = 200, description = "Probe report, successful or not", body = ApiResponse),
        (status = 404, description = "Provider not found", body = ErrorResponse),
    ),
    tag = "Providers"
)]
pub async fn test_provider(
    catalog: Extension<DefinitionCatalog>,
    client: Extension<Arc<dyn ProviderClient>>,
    id: Path<String>,
) -> Result<Json<ApiResponse<ProbeReport>>, ErrorResponse> {
    shared::test_provider(catalog, client, id).await
}
