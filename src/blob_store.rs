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

//! Storage for large static payloads referenced by `staticBlobKey`.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("Blob '{bucket}/{key}' not found")]
    NotFound { bucket: String, key: String },

    #[error("Invalid blob key '{0}'")]
    InvalidKey(String),

    #[error("Failed to read blob '{bucket}/{key}': {source}")]
    Io {
        bucket: String,
        key: String,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the text stored under `bucket`/`key`.
    async fn get(&self, bucket: &str, key: &str) -> Result<String, BlobStoreError>;
}

/// Blob store backed by a directory tree: `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, BlobStoreError> {
        if !is_plain_relative(bucket) {
            return Err(BlobStoreError::InvalidKey(bucket.to_string()));
        }
        if !is_plain_relative(key) {
            return Err(BlobStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(bucket).join(key))
    }
}

/// Only normal path components, so a key can never leave its bucket.
fn is_plain_relative(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<String, BlobStoreError> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BlobStoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(BlobStoreError::Io {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source: e,
            }),
        }
    }
}
