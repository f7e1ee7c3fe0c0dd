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

use serde_json::{json, Value};
use std::time::Duration;

use crate::blob_store::BlobStoreError;
use crate::database::DatabaseError;
use crate::provider_client::ProviderError;

/// Failure while resolving an endpoint or feed.
///
/// Configuration problems are recoverable: they are answered with an
/// `{"error": ...}` payload. Upstream failures propagate to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Provider not found")]
    ProviderNotFound,

    #[error("Database config not found")]
    DatabaseNotFound,

    #[error("Unknown database type")]
    UnknownDatabaseType,

    #[error("Unknown API type")]
    UnknownApiType,

    #[error("Failed to fetch static response")]
    StaticBlob(#[source] StaticBlobError),

    #[error(transparent)]
    Upstream(#[from] ProviderError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Resolution timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum StaticBlobError {
    #[error(transparent)]
    Store(#[from] BlobStoreError),

    #[error("stored payload is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
}

impl ResolveError {
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ResolveError::ProviderNotFound
                | ResolveError::DatabaseNotFound
                | ResolveError::UnknownDatabaseType
                | ResolveError::UnknownApiType
                | ResolveError::StaticBlob(_)
        )
    }

    pub fn to_payload(&self) -> Value {
        error_payload(self.to_string())
    }
}

/// `{"error": message}`
pub fn error_payload(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}
