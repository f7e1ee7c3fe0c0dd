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

//! Error types for the management API.
//!
//! Public resolution routes answer with `{"error": "..."}` bodies instead; see
//! [`super::handlers`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Error codes for API responses
pub mod error_codes {
    pub const API_NOT_FOUND: &str = "API_NOT_FOUND";
    pub const FEED_NOT_FOUND: &str = "FEED_NOT_FOUND";
    pub const PROVIDER_NOT_FOUND: &str = "PROVIDER_NOT_FOUND";

    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// API error response structure
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetail>,
}

/// Additional error details
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    /// Kind of definition involved (api, feed, provider)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Definition id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_details: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: ErrorDetail) -> Self {
        self.details = Some(details);
        self
    }

    /// Pair the response with the status its code maps to.
    pub fn with_status(self) -> (StatusCode, axum::Json<Self>) {
        let status = status_from_code(&self.code);
        (status, axum::Json(self))
    }

    pub fn not_found(resource_type: &str, resource_id: &str) -> Self {
        let code = match resource_type {
            "api" => error_codes::API_NOT_FOUND,
            "feed" => error_codes::FEED_NOT_FOUND,
            "provider" => error_codes::PROVIDER_NOT_FOUND,
            _ => error_codes::INTERNAL_ERROR,
        };
        ErrorResponse::new(code, format!("{resource_type} '{resource_id}' not found")).with_details(
            ErrorDetail {
                resource_type: Some(resource_type.to_string()),
                resource_id: Some(resource_id.to_string()),
                technical_details: None,
            },
        )
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        self.with_status().into_response()
    }
}

fn status_from_code(code: &str) -> StatusCode {
    match code {
        error_codes::API_NOT_FOUND
        | error_codes::FEED_NOT_FOUND
        | error_codes::PROVIDER_NOT_FOUND => StatusCode::NOT_FOUND,

        error_codes::INVALID_REQUEST => StatusCode::BAD_REQUEST,

        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let (status, body) = ErrorResponse::not_found("provider", "cms").with_status();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, error_codes::PROVIDER_NOT_FOUND);
        assert_eq!(body.message, "provider 'cms' not found");
    }

    #[test]
    fn test_serialization_omits_empty_details() {
        let json = serde_json::to_string(&ErrorResponse::new("X", "y")).unwrap();
        assert_eq!(json, r#"{"code":"X","message":"y"}"#);

        let json = serde_json::to_value(ErrorResponse::not_found("feed", "f1")).unwrap();
        assert_eq!(json["details"]["resourceType"], "feed");
        assert!(json["details"].get("technicalDetails").is_none());
    }

    #[test]
    fn test_status_from_code() {
        assert_eq!(status_from_code(error_codes::API_NOT_FOUND), StatusCode::NOT_FOUND);
        assert_eq!(
            status_from_code(error_codes::INVALID_REQUEST),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_from_code("SOMETHING_ELSE"), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
