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

//! Common response types shared across API versions.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{EndpointDefinition, FeedDefinition, HttpMethod};

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status of the server
    pub status: String,
    /// Current server timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// An API endpoint as listed by the management API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummary {
    pub id: String,
    pub label: String,
    pub property: String,
    pub route: String,
    pub method: HttpMethod,
    /// `STATIC` or `DYNAMIC`
    pub api_type: String,
    pub rotation: u32,
    pub hit_count: u64,
}

impl From<&EndpointDefinition> for ApiSummary {
    fn from(endpoint: &EndpointDefinition) -> Self {
        Self {
            id: endpoint.id.clone(),
            label: endpoint.label.clone(),
            property: endpoint.property.clone(),
            route: endpoint.route.clone(),
            method: endpoint.method,
            api_type: endpoint.kind.type_name().to_string(),
            rotation: endpoint.rotation,
            hit_count: endpoint.hit_count,
        }
    }
}

/// A feed as listed by the management API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedSummary {
    pub id: String,
    pub name: String,
    pub property: String,
    pub route: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

impl From<&FeedDefinition> for FeedSummary {
    fn from(feed: &FeedDefinition) -> Self {
        Self {
            id: feed.id.clone(),
            name: feed.name.clone(),
            property: feed.property.clone(),
            route: feed.route.clone(),
            is_active: feed.is_active,
            provider_id: feed.provider_id.clone(),
        }
    }
}

/// Generic API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data if successful
    pub data: Option<T>,
    /// Error message if unsuccessful
    pub error: Option<String>,
}

/// Generic API Response schema for OpenAPI documentation
#[derive(Serialize, ToSchema)]
#[schema(as = ApiResponse)]
pub struct ApiResponseSchema {
    /// Whether the request was successful
    pub success: bool,
    /// Response data if successful
    pub data: Option<serde_json::Value>,
    /// Error message if unsuccessful
    pub error: Option<String>,
}

/// Response listing available API versions
#[derive(Serialize, ToSchema)]
pub struct ApiVersionsResponse {
    /// List of available API versions
    pub versions: Vec<String>,
    /// The current/latest API version
    pub current: String,
}

/// Body of a failed public resolution request.
#[derive(Serialize, ToSchema)]
pub struct ResolutionErrorBody {
    pub error: String,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}
