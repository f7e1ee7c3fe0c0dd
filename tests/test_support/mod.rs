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

//! In-memory collaborators and fixtures shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use apiforge_server::blob_store::{BlobStore, BlobStoreError};
use apiforge_server::database::{DatabaseError, DatabaseReader};
use apiforge_server::models::{
    DatabaseConnection, EndpointDefinition, FeedDefinition, ProviderDefinition,
};
use apiforge_server::provider_client::{ProviderClient, ProviderError};
use apiforge_server::{ApiForgeServerBuilder, DefinitionCatalog};

/// Provider client answering from a table keyed by provider id.
#[derive(Clone, Default)]
pub struct MockProviderClient {
    responses: Arc<Mutex<HashMap<String, Value>>>,
    failures: Arc<Mutex<HashMap<String, u16>>>,
    calls: Arc<Mutex<Vec<ProviderDefinition>>>,
}

impl MockProviderClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, provider_id: &str, body: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(provider_id.to_string(), body);
        self
    }

    /// Make `provider_id` answer with a non-2xx status.
    pub fn with_failure(self, provider_id: &str, status: u16) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(provider_id.to_string(), status);
        self
    }

    /// Every provider the client was asked to call, in order.
    pub fn calls(&self) -> Vec<ProviderDefinition> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderClient for MockProviderClient {
    async fn call(&self, provider: &ProviderDefinition) -> Result<Value, ProviderError> {
        self.calls.lock().unwrap().push(provider.clone());

        if let Some(status) = self.failures.lock().unwrap().get(&provider.id) {
            return Err(ProviderError::Status {
                status: *status,
                reason: "Mock Failure".to_string(),
            });
        }
        self.responses
            .lock()
            .unwrap()
            .get(&provider.id)
            .cloned()
            .ok_or_else(|| ProviderError::Transport(format!("no mock for '{}'", provider.id)))
    }
}

/// Blob store holding payloads in memory.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<(String, String), String>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(self, bucket: &str, key: &str, contents: &str) -> Self {
        self.blobs.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            contents.to_string(),
        );
        self
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<String, BlobStoreError> {
        self.blobs
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| BlobStoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}

/// A read seen by [`MockDatabaseReader`].
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseRead {
    pub backend: &'static str,
    pub uri: String,
    pub collection: String,
    pub query: Map<String, Value>,
}

/// Database reader returning canned rows and recording each read.
#[derive(Clone, Default)]
pub struct MockDatabaseReader {
    rows: Vec<Value>,
    fail: bool,
    reads: Arc<Mutex<Vec<DatabaseRead>>>,
}

impl MockDatabaseReader {
    pub fn returning(rows: Vec<Value>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn reads(&self) -> Vec<DatabaseRead> {
        self.reads.lock().unwrap().clone()
    }

    fn read(
        &self,
        backend: &'static str,
        connection: &DatabaseConnection,
        collection: &str,
        query: &Map<String, Value>,
    ) -> Result<Vec<Value>, DatabaseError> {
        self.reads.lock().unwrap().push(DatabaseRead {
            backend,
            uri: connection.connection_uri(),
            collection: collection.to_string(),
            query: query.clone(),
        });
        if self.fail {
            return Err(DatabaseError::Connection("connection refused".to_string()));
        }
        Ok(self.rows.clone())
    }
}

#[async_trait]
impl DatabaseReader for MockDatabaseReader {
    async fn read_mongo(
        &self,
        connection: &DatabaseConnection,
        collection: &str,
        query: &Map<String, Value>,
    ) -> Result<Vec<Value>, DatabaseError> {
        self.read("mongo", connection, collection, query)
    }

    async fn read_mysql(
        &self,
        connection: &DatabaseConnection,
        table: &str,
        query: &Map<String, Value>,
    ) -> Result<Vec<Value>, DatabaseError> {
        self.read("mysql", connection, table, query)
    }
}

pub fn provider(id: &str, url: &str) -> ProviderDefinition {
    serde_json::from_value(json!({ "id": id, "url": url })).unwrap()
}

pub fn endpoint(value: Value) -> EndpointDefinition {
    serde_json::from_value(value).unwrap()
}

pub fn feed(value: Value) -> FeedDefinition {
    serde_json::from_value(value).unwrap()
}

pub fn database(id: &str, kind: &str) -> DatabaseConnection {
    serde_json::from_value(json!({
        "id": id,
        "type": kind,
        "uri": "mysql://user:pw@localhost:3306",
        "database": "content"
    }))
    .unwrap()
}

/// The full application router over `catalog` and the given collaborators.
pub async fn create_test_router(
    catalog: DefinitionCatalog,
    provider_client: MockProviderClient,
    blob_store: MemoryBlobStore,
    database_reader: MockDatabaseReader,
) -> Router {
    ApiForgeServerBuilder::new()
        .with_catalog(catalog)
        .with_provider_client(Arc::new(provider_client))
        .with_blob_store(Arc::new(blob_store))
        .with_database_reader(Arc::new(database_reader))
        .build()
        .await
        .expect("Failed to build test server")
        .router()
}
