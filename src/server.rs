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

use anyhow::Result;
use axum::{routing::get, Extension, Router};
use log::info;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{self, ResolutionContext, API_CURRENT_VERSION};
use crate::builder::ApiForgeServerBuilder;
use crate::catalog::DefinitionCatalog;
use crate::config::load_or_create_config_file;
use crate::provider_client::ProviderClient;

pub struct ApiForgeServer {
    host: String,
    port: u16,
    catalog: DefinitionCatalog,
    provider_client: Arc<dyn ProviderClient>,
    resolution: ResolutionContext,
}

impl ApiForgeServer {
    /// Create a server from a configuration file, writing a default one if
    /// the file does not exist yet.
    pub async fn new(config_path: impl AsRef<Path>, port_override: Option<u16>) -> Result<Self> {
        let config = load_or_create_config_file(config_path.as_ref())?;
        let mut builder = ApiForgeServerBuilder::new().with_config(config);
        if let Some(port) = port_override {
            builder = builder.with_port(port);
        }
        builder.build().await
    }

    pub(crate) fn from_parts(
        host: String,
        port: u16,
        catalog: DefinitionCatalog,
        provider_client: Arc<dyn ProviderClient>,
        resolution: ResolutionContext,
    ) -> Self {
        Self {
            host,
            port,
            catalog,
            provider_client,
            resolution,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn catalog(&self) -> &DefinitionCatalog {
        &self.catalog
    }

    /// The full application router: public resolution routes, management
    /// API, OpenAPI document and Swagger UI.
    pub fn router(&self) -> Router {
        let openapi_v1 = api::ApiDocV1::openapi();
        let v1_router = api::build_v1_router(self.catalog.clone(), self.provider_client.clone());
        let prefix = API_CURRENT_VERSION.path_prefix();

        let public_routes = Router::new()
            .route(
                "/api/:property/:route",
                get(api::resolve_api).post(api::resolve_api),
            )
            .route("/api/feed/:property/:route", get(api::resolve_feed))
            .layer(Extension(self.resolution.clone()));

        Router::new()
            .route("/health", get(api::health_check))
            .route("/api/versions", get(api::list_api_versions))
            .merge(public_routes)
            .nest(prefix, v1_router)
            .merge(
                SwaggerUi::new(format!("{prefix}/docs"))
                    .url(format!("{prefix}/openapi.json"), openapi_v1),
            )
            .layer(CorsLayer::permissive())
    }

    /// Serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let addr = self.bind_address();
        let app = self.router();
        let prefix = API_CURRENT_VERSION.path_prefix();

        info!(
            "Serving {} APIs and {} feeds",
            self.catalog.list_endpoints().await.len(),
            self.catalog.list_feeds().await.len()
        );
        info!("Starting ApiForge Server on {addr}");
        info!("Management API available at http://{addr}{prefix}/");
        info!("Swagger UI available at http://{addr}{prefix}/docs/");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("ApiForge Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down ApiForge Server");
}
