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

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::{DatabaseConnection, EndpointDefinition, FeedDefinition, ProviderDefinition};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Ceiling for a single provider call or database read.
    #[serde(default = "default_resolution_timeout_secs")]
    pub resolution_timeout_secs: u64,
    #[serde(default)]
    pub blob_store: BlobStoreSettings,
    #[serde(default)]
    pub providers: Vec<ProviderDefinition>,
    #[serde(default)]
    pub databases: Vec<DatabaseConnection>,
    #[serde(default)]
    pub apis: Vec<EndpointDefinition>,
    #[serde(default)]
    pub feeds: Vec<FeedDefinition>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            resolution_timeout_secs: default_resolution_timeout_secs(),
            blob_store: BlobStoreSettings::default(),
            providers: Vec::new(),
            databases: Vec::new(),
            apis: Vec::new(),
            feeds: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn resolution_timeout(&self) -> Duration {
        Duration::from_secs(self.resolution_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Location of large static payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobStoreSettings {
    #[serde(default = "default_blob_root")]
    pub root: PathBuf,
    #[serde(default = "default_blob_bucket")]
    pub bucket: String,
}

impl Default for BlobStoreSettings {
    fn default() -> Self {
        Self {
            root: default_blob_root(),
            bucket: default_blob_bucket(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_resolution_timeout_secs() -> u64 {
    30
}

fn default_blob_root() -> PathBuf {
    PathBuf::from("./data/blobs")
}

fn default_blob_bucket() -> String {
    "static".to_string()
}
