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

//! OpenAPI Integration Tests
//!
//! Verifies that the OpenAPI document covers every route and schema.

#![allow(clippy::unwrap_used)]

use apiforge_server::api::v1::openapi::ApiDocV1;
use serde_json::Value;
use utoipa::OpenApi;

fn openapi_json() -> Value {
    serde_json::to_value(ApiDocV1::openapi()).unwrap()
}

#[test]
fn test_openapi_documents_all_routes() {
    let json = openapi_json();
    let paths = &json["paths"];

    for (path, method) in [
        ("/health", "get"),
        ("/api/versions", "get"),
        ("/api/{property}/{route}", "get"),
        ("/api/feed/{property}/{route}", "get"),
        ("/api/v1/apis", "get"),
        ("/api/v1/apis/{id}", "get"),
        ("/api/v1/properties", "get"),
        ("/api/v1/feeds", "get"),
        ("/api/v1/feeds/{id}", "get"),
        ("/api/v1/analytics", "get"),
        ("/api/v1/providers/{id}/test", "post"),
    ] {
        assert!(
            paths[path][method].is_object(),
            "{} {path} should be documented",
            method.to_uppercase()
        );
    }
}

#[test]
fn test_openapi_registers_schemas() {
    let json = openapi_json();
    let schemas = &json["components"]["schemas"];

    for name in [
        "ApiSummary",
        "FeedSummary",
        "AnalyticsReport",
        "ProbeReport",
        "ErrorResponse",
        "ApiResponse",
    ] {
        assert!(schemas[name].is_object(), "schema {name} should be registered");
    }

    let summary = &schemas["ApiSummary"]["properties"];
    assert!(summary["hitCount"].is_object());
    assert!(summary["apiType"].is_object());
}

#[test]
fn test_openapi_info() {
    let json = openapi_json();
    assert_eq!(json["info"]["title"], "ApiForge Server API");
    assert_eq!(json["info"]["license"]["name"], "Apache-2.0");
}
