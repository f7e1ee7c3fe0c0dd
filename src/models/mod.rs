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

//! Stored definitions read by the resolvers.
//!
//! These types mirror the catalog section of the server configuration file.
//! Field names are camelCase on the wire.

mod database;
mod endpoint;
mod feed;
mod provider;

pub use database::{DatabaseConnection, DatabaseKind};
pub use endpoint::{
    ApiSourceConfig, DatabaseSourceConfig, DynamicConfig, DynamicSource, EndpointDefinition,
    EndpointKind, StaticSource,
};
pub use feed::{AdConfig, FeedDefinition, FeedMeta, ItemTemplate, Pagination};
pub use provider::{HttpMethod, ProviderDefinition};
