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

//! Resolution of virtual API endpoints.

use log::{debug, error, warn};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

use super::error::{ResolveError, StaticBlobError};
use super::key_path::extract;
use super::rotation::rotate;
use super::template::apply_template;
use super::{within, DEFAULT_RESOLUTION_TIMEOUT};
use crate::blob_store::BlobStore;
use crate::catalog::DefinitionLookup;
use crate::database::DatabaseReader;
use crate::models::{
    ApiSourceConfig, DatabaseKind, DatabaseSourceConfig, DynamicConfig, DynamicSource,
    EndpointDefinition, EndpointKind, StaticSource,
};
use crate::provider_client::ProviderClient;

pub const DEFAULT_BLOB_BUCKET: &str = "static";

/// Turns an [`EndpointDefinition`] into its response payload.
#[derive(Clone)]
pub struct ApiResolver {
    definitions: Arc<dyn DefinitionLookup>,
    provider_client: Arc<dyn ProviderClient>,
    blob_store: Arc<dyn BlobStore>,
    database_reader: Arc<dyn DatabaseReader>,
    blob_bucket: String,
    timeout: Duration,
}

impl ApiResolver {
    pub fn new(
        definitions: Arc<dyn DefinitionLookup>,
        provider_client: Arc<dyn ProviderClient>,
        blob_store: Arc<dyn BlobStore>,
        database_reader: Arc<dyn DatabaseReader>,
    ) -> Self {
        Self {
            definitions,
            provider_client,
            blob_store,
            database_reader,
            blob_bucket: DEFAULT_BLOB_BUCKET.to_string(),
            timeout: DEFAULT_RESOLUTION_TIMEOUT,
        }
    }

    pub fn with_blob_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.blob_bucket = bucket.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve `endpoint` into its payload.
    ///
    /// Configuration problems yield `Ok({"error": ...})`. Provider, database
    /// and timeout failures yield `Err`. Rotation is applied to successful
    /// payloads only.
    pub async fn resolve(&self, endpoint: &EndpointDefinition) -> Result<Value, ResolveError> {
        match self.resolve_payload(endpoint).await {
            Ok(payload) => Ok(rotate(payload, endpoint.rotation)),
            Err(err) if err.is_recoverable() => {
                warn!("API '{}' resolved to an error payload: {err}", endpoint.id);
                Ok(err.to_payload())
            }
            Err(err) => {
                error!("API '{}' failed to resolve: {err}", endpoint.id);
                Err(err)
            }
        }
    }

    async fn resolve_payload(&self, endpoint: &EndpointDefinition) -> Result<Value, ResolveError> {
        debug!(
            "Resolving API '{}' ({}) at {}/{}",
            endpoint.id,
            endpoint.kind.type_name(),
            endpoint.property,
            endpoint.route
        );
        match &endpoint.kind {
            EndpointKind::Static(source) => self.resolve_static(source).await,
            EndpointKind::Dynamic(DynamicSource {
                dynamic_config: Some(DynamicConfig::Api(config)),
            }) => self.resolve_api_source(config).await,
            EndpointKind::Dynamic(DynamicSource {
                dynamic_config: Some(DynamicConfig::Database(config)),
            }) => self.resolve_database_source(config).await,
            EndpointKind::Dynamic(DynamicSource {
                dynamic_config: None,
            }) => Err(ResolveError::UnknownApiType),
        }
    }

    async fn resolve_static(&self, source: &StaticSource) -> Result<Value, ResolveError> {
        if let Some(response) = &source.static_response {
            return Ok(response.clone());
        }

        let key = match source.static_blob_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Ok(json!({})),
        };

        let raw = self
            .blob_store
            .get(&self.blob_bucket, key)
            .await
            .map_err(|e| {
                error!("Failed to fetch static blob '{}/{key}': {e}", self.blob_bucket);
                ResolveError::StaticBlob(StaticBlobError::Store(e))
            })?;

        serde_json::from_str(&raw).map_err(|e| {
            error!("Static blob '{}/{key}' is not valid JSON: {e}", self.blob_bucket);
            ResolveError::StaticBlob(StaticBlobError::Parse(e))
        })
    }

    async fn resolve_api_source(&self, config: &ApiSourceConfig) -> Result<Value, ResolveError> {
        let provider = self
            .definitions
            .find_provider(&config.provider_id)
            .await
            .ok_or(ResolveError::ProviderNotFound)?;

        let response = within(self.timeout, self.provider_client.call(&provider)).await?;

        let data = match config.response_key_path.as_deref() {
            Some(path) if !path.is_empty() => extract(&response, path).cloned().unwrap_or(Value::Null),
            _ => response,
        };

        let data = match (data, &config.dynamic_data_template) {
            (Value::Array(items), Some(template)) => Value::Array(apply_template(&items, template)),
            (data, _) => data,
        };

        Ok(merge_static_data(
            config.static_data.as_ref(),
            config.dynamic_data_key.as_deref(),
            data,
        ))
    }

    async fn resolve_database_source(
        &self,
        config: &DatabaseSourceConfig,
    ) -> Result<Value, ResolveError> {
        let connection = self
            .definitions
            .find_database(&config.database_config_id)
            .await
            .ok_or(ResolveError::DatabaseNotFound)?;

        let rows = match connection.kind() {
            Some(DatabaseKind::MongoDb) => {
                within(
                    self.timeout,
                    self.database_reader
                        .read_mongo(&connection, &config.collection, &config.query),
                )
                .await?
            }
            Some(DatabaseKind::MySql) => {
                within(
                    self.timeout,
                    self.database_reader
                        .read_mysql(&connection, &config.collection, &config.query),
                )
                .await?
            }
            None => return Err(ResolveError::UnknownDatabaseType),
        };

        Ok(Value::Array(rows))
    }
}

/// Combine fetched data with the endpoint's fixed fields.
///
/// With a `dynamicDataKey` the data is nested under that key (overriding a
/// static field of the same name). Without one, non-empty static data nests
/// the fetched data under `data`; otherwise the data is returned alone.
fn merge_static_data(
    static_data: Option<&Map<String, Value>>,
    dynamic_data_key: Option<&str>,
    data: Value,
) -> Value {
    let mut merged = static_data.cloned().unwrap_or_default();
    match dynamic_data_key {
        Some(key) if !key.is_empty() => {
            merged.insert(key.to_string(), data);
            Value::Object(merged)
        }
        _ if !merged.is_empty() => {
            merged.insert("data".to_string(), data);
            Value::Object(merged)
        }
        _ => data,
    }
}
