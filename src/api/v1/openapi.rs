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

//! OpenAPI documentation for API v1.
//!
//! The document is served at `/api/v1/openapi.json` and the Swagger UI at
//! `/api/v1/docs/`.

use utoipa::OpenApi;

use crate::api::shared::{
    ApiResponseSchema, ApiSummary, ApiVersionsResponse, ErrorDetail, ErrorResponse, FeedSummary,
    HealthResponse, ResolutionErrorBody,
};
use crate::hits::{AnalyticsReport, ApiHitCount, DailyHits};
use crate::models::HttpMethod;
use crate::provider_client::{ProbeReport, ProbeRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::list_api_versions,
        super::handlers::health_check,
        super::handlers::resolve_api,
        super::handlers::resolve_feed,
        super::handlers::list_apis,
        super::handlers::get_api,
        super::handlers::list_properties,
        super::handlers::list_feeds,
        super::handlers::get_feed,
        super::handlers::get_analytics,
        super::handlers::test_provider,
    ),
    components(
        schemas(
            HealthResponse,
            ApiResponseSchema,
            ApiVersionsResponse,
            ApiSummary,
            FeedSummary,
            AnalyticsReport,
            ApiHitCount,
            DailyHits,
            ProbeReport,
            ProbeRequest,
            HttpMethod,
            ResolutionErrorBody,
            ErrorResponse,
            ErrorDetail,
        )
    ),
    tags(
        (name = "API", description = "API version information"),
        (name = "Health", description = "Health check endpoints"),
        (name = "Resolution", description = "Public virtual API and feed routes"),
        (name = "Apis", description = "Virtual API endpoint catalog"),
        (name = "Feeds", description = "Feed catalog"),
        (name = "Analytics", description = "Hit analytics"),
        (name = "Providers", description = "External provider checks"),
    ),
    info(
        title = "ApiForge Server API",
        version = "1.0.0",
        description = "ApiForge Server REST API v1.\n\nApiForge serves virtual JSON endpoints and paginated feeds assembled from static payloads, external HTTP providers and database reads.\n\n## Public routes\n\n- `/api/{property}/{route}` - resolve a virtual API endpoint\n- `/api/feed/{property}/{route}` - resolve a feed page (`skip`/`limit` query parameters by default)\n\n## Management routes\n\nAll management endpoints are prefixed with `/api/v1/`.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    )
)]
pub struct ApiDocV1;
