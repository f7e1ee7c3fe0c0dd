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

//! ApiForge Server: a virtual API and feed server.
//!
//! Endpoints and feeds are declared in a configuration file and resolved on
//! request from inline JSON, blob-stored payloads, upstream HTTP providers or
//! database reads. Templates reshape upstream data before it is returned.

pub mod api;
pub mod blob_store;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod database;
pub mod hits;
pub mod models;
pub mod provider_client;
pub mod resolver;
pub mod server;

// Main exports for library users
pub use builder::ApiForgeServerBuilder;
pub use server::ApiForgeServer;

pub use catalog::{CatalogError, DefinitionCatalog, DefinitionLookup};
pub use config::{
    load_config_file, load_or_create_config_file, save_config_file, ConfigError, ServerConfig,
};
pub use hits::{HitRecord, HitRecorder};
pub use resolver::{ApiResolver, FeedResolver, ResolveError};

pub use blob_store::{BlobStore, FsBlobStore};
pub use database::{DatabaseReader, DriverDatabaseReader};
pub use provider_client::{HttpProviderClient, ProviderClient, ProviderError};
