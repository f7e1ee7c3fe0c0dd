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
use std::sync::Arc;

use crate::api::ResolutionContext;
use crate::blob_store::{BlobStore, FsBlobStore};
use crate::catalog::{DefinitionCatalog, DefinitionLookup};
use crate::config::ServerConfig;
use crate::database::{DatabaseReader, DriverDatabaseReader};
use crate::hits::HitRecorder;
use crate::provider_client::{HttpProviderClient, ProviderClient};
use crate::resolver::{ApiResolver, FeedResolver};
use crate::server::ApiForgeServer;

/// Builder for assembling an [`ApiForgeServer`] programmatically.
///
/// Collaborators that are not supplied are created from the configuration:
/// the catalog from its definitions, an HTTP provider client, a filesystem
/// blob store and the MySQL database reader.
pub struct ApiForgeServerBuilder {
    config: ServerConfig,
    catalog: Option<DefinitionCatalog>,
    provider_client: Option<Arc<dyn ProviderClient>>,
    blob_store: Option<Arc<dyn BlobStore>>,
    database_reader: Option<Arc<dyn DatabaseReader>>,
}

impl Default for ApiForgeServerBuilder {
    fn default() -> Self {
        Self {
            config: ServerConfig {
                host: "127.0.0.1".to_string(),
                ..ServerConfig::default()
            },
            catalog: None,
            provider_client: None,
            blob_store: None,
            database_reader: None,
        }
    }
}

impl ApiForgeServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` for settings and, unless a catalog is supplied, definitions.
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn with_host_port(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.host = host.into();
        self.config.port = port;
        self
    }

    /// Serve an existing catalog instead of one built from the configuration.
    pub fn with_catalog(mut self, catalog: DefinitionCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_provider_client(mut self, client: Arc<dyn ProviderClient>) -> Self {
        self.provider_client = Some(client);
        self
    }

    pub fn with_blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    pub fn with_database_reader(mut self, reader: Arc<dyn DatabaseReader>) -> Self {
        self.database_reader = Some(reader);
        self
    }

    pub async fn build(self) -> Result<ApiForgeServer> {
        let config = self.config;
        let timeout = config.resolution_timeout();

        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => DefinitionCatalog::from_config(&config).await?,
        };
        let provider_client: Arc<dyn ProviderClient> = match self.provider_client {
            Some(client) => client,
            None => Arc::new(HttpProviderClient::new(timeout)?),
        };
        let blob_store: Arc<dyn BlobStore> = self
            .blob_store
            .unwrap_or_else(|| Arc::new(FsBlobStore::new(config.blob_store.root.clone())));
        let database_reader: Arc<dyn DatabaseReader> = self
            .database_reader
            .unwrap_or_else(|| Arc::new(DriverDatabaseReader::new()));

        let definitions: Arc<dyn DefinitionLookup> = Arc::new(catalog.clone());
        let hits: Arc<dyn HitRecorder> = Arc::new(catalog.clone());

        let api_resolver = ApiResolver::new(
            definitions.clone(),
            provider_client.clone(),
            blob_store,
            database_reader,
        )
        .with_blob_bucket(config.blob_store.bucket.clone())
        .with_timeout(timeout);
        let feed_resolver =
            FeedResolver::new(definitions.clone(), provider_client.clone()).with_timeout(timeout);

        let resolution = ResolutionContext {
            definitions,
            hits,
            api_resolver: Arc::new(api_resolver),
            feed_resolver: Arc::new(feed_resolver),
        };

        Ok(ApiForgeServer::from_parts(
            config.host,
            config.port,
            catalog,
            provider_client,
            resolution,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = ApiForgeServerBuilder::new();
        assert_eq!(builder.config.host, "127.0.0.1");
        assert_eq!(builder.config.port, 8080);
        assert!(builder.catalog.is_none());
    }

    #[tokio::test]
    async fn test_build_binds_configured_address() {
        let server = ApiForgeServerBuilder::new()
            .with_host_port("0.0.0.0", 9191)
            .build()
            .await
            .unwrap();
        assert_eq!(server.bind_address(), "0.0.0.0:9191");
    }

    #[tokio::test]
    async fn test_build_rejects_duplicate_routes() {
        let config: ServerConfig = serde_yaml::from_str(
            r#"
apis:
  - { id: a, property: web, route: home, apiType: STATIC }
  - { id: b, property: web, route: home, apiType: STATIC }
"#,
        )
        .unwrap();

        let result = ApiForgeServerBuilder::new().with_config(config).build().await;
        assert!(result.is_err());
    }
}
