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

//! API v1 route definitions.
//!
//! Management routes, nested under `/api/v1/` by the server.

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use crate::catalog::DefinitionCatalog;
use crate::provider_client::ProviderClient;

/// Build the v1 management router.
pub fn build_v1_router(catalog: DefinitionCatalog, provider_client: Arc<dyn ProviderClient>) -> Router {
    Router::new()
        .route("/apis", get(handlers::list_apis))
        .route("/apis/:id", get(handlers::get_api))
        .route("/properties", get(handlers::list_properties))
        .route("/feeds", get(handlers::list_feeds))
        .route("/feeds/:id", get(handlers::get_feed))
        .route("/analytics", get(handlers::get_analytics))
        .route("/providers/:id/test", post(handlers::test_provider))
        .layer(Extension(catalog))
        .layer(Extension(provider_client))
}
