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

//! In-memory catalog of providers, databases, endpoints and feeds.
//!
//! The catalog is the lookup side of resolution and the sink for hit
//! accounting. It is shared between request handlers behind a single lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::hits::{summarize, AnalyticsReport, HitEntry, HitError, HitRecord, HitRecorder};
use crate::models::{DatabaseConnection, EndpointDefinition, FeedDefinition, ProviderDefinition};

/// Most recent hits kept for analytics.
pub const MAX_HIT_LOG: usize = 10_000;

#[async_trait]
pub trait DefinitionLookup: Send + Sync {
    async fn find_endpoint(&self, property: &str, route: &str) -> Option<EndpointDefinition>;

    /// Only active feeds are returned.
    async fn find_feed(&self, property: &str, route: &str) -> Option<FeedDefinition>;

    async fn find_provider(&self, id: &str) -> Option<ProviderDefinition>;

    async fn find_database(&self, id: &str) -> Option<DatabaseConnection>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{kind} '{id}' already exists")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{kind} route '{property}/{route}' is already taken by '{existing}'")]
    DuplicateRoute {
        kind: &'static str,
        property: String,
        route: String,
        existing: String,
    },
}

type RouteKey = (String, String);

#[derive(Default)]
struct CatalogState {
    providers: IndexMap<String, ProviderDefinition>,
    databases: IndexMap<String, DatabaseConnection>,
    endpoints: IndexMap<String, EndpointDefinition>,
    endpoint_routes: HashMap<RouteKey, String>,
    feeds: IndexMap<String, FeedDefinition>,
    feed_routes: HashMap<RouteKey, String>,
    hit_log: VecDeque<HitEntry>,
}

fn route_key(property: &str, route: &str) -> RouteKey {
    (property.to_string(), route.to_string())
}

/// Thread-safe definition catalog.
#[derive(Clone, Default)]
pub struct DefinitionCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl DefinitionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from every definition in the configuration.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, CatalogError> {
        let catalog = Self::new();
        for provider in &config.providers {
            catalog.add_provider(provider.clone()).await?;
        }
        for database in &config.databases {
            catalog.add_database(database.clone()).await?;
        }
        for endpoint in &config.apis {
            catalog.add_endpoint(endpoint.clone()).await?;
        }
        for feed in &config.feeds {
            catalog.add_feed(feed.clone()).await?;
        }
        Ok(catalog)
    }

    pub async fn add_provider(&self, provider: ProviderDefinition) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        if state.providers.contains_key(&provider.id) {
            return Err(CatalogError::DuplicateId {
                kind: "Provider",
                id: provider.id,
            });
        }
        state.providers.insert(provider.id.clone(), provider);
        Ok(())
    }

    pub async fn add_database(&self, database: DatabaseConnection) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        if state.databases.contains_key(&database.id) {
            return Err(CatalogError::DuplicateId {
                kind: "Database",
                id: database.id,
            });
        }
        state.databases.insert(database.id.clone(), database);
        Ok(())
    }

    pub async fn add_endpoint(&self, endpoint: EndpointDefinition) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        if state.endpoints.contains_key(&endpoint.id) {
            return Err(CatalogError::DuplicateId {
                kind: "API",
                id: endpoint.id,
            });
        }
        let key = route_key(&endpoint.property, &endpoint.route);
        if let Some(existing) = state.endpoint_routes.get(&key) {
            return Err(CatalogError::DuplicateRoute {
                kind: "API",
                property: endpoint.property,
                route: endpoint.route,
                existing: existing.clone(),
            });
        }
        state.endpoint_routes.insert(key, endpoint.id.clone());
        state.endpoints.insert(endpoint.id.clone(), endpoint);
        Ok(())
    }

    pub async fn add_feed(&self, feed: FeedDefinition) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        if state.feeds.contains_key(&feed.id) {
            return Err(CatalogError::DuplicateId {
                kind: "Feed",
                id: feed.id,
            });
        }
        let key = route_key(&feed.property, &feed.route);
        if let Some(existing) = state.feed_routes.get(&key) {
            return Err(CatalogError::DuplicateRoute {
                kind: "Feed",
                property: feed.property,
                route: feed.route,
                existing: existing.clone(),
            });
        }
        state.feed_routes.insert(key, feed.id.clone());
        state.feeds.insert(feed.id.clone(), feed);
        Ok(())
    }

    pub async fn list_endpoints(&self) -> Vec<EndpointDefinition> {
        let state = self.state.read().await;
        state.endpoints.values().cloned().collect()
    }

    pub async fn list_feeds(&self) -> Vec<FeedDefinition> {
        let state = self.state.read().await;
        state.feeds.values().cloned().collect()
    }

    pub async fn list_providers(&self) -> Vec<ProviderDefinition> {
        let state = self.state.read().await;
        state.providers.values().cloned().collect()
    }

    /// Endpoint by id, regardless of route.
    pub async fn get_endpoint(&self, id: &str) -> Option<EndpointDefinition> {
        let state = self.state.read().await;
        state.endpoints.get(id).cloned()
    }

    /// Feed by id, inactive feeds included.
    pub async fn get_feed(&self, id: &str) -> Option<FeedDefinition> {
        let state = self.state.read().await;
        state.feeds.get(id).cloned()
    }

    /// Distinct properties of the configured endpoints, sorted.
    pub async fn list_properties(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut properties: Vec<String> = state
            .endpoints
            .values()
            .map(|endpoint| endpoint.property.clone())
            .collect();
        properties.sort();
        properties.dedup();
        properties
    }

    pub async fn hit_log(&self) -> Vec<HitEntry> {
        let state = self.state.read().await;
        state.hit_log.iter().cloned().collect()
    }

    pub async fn analytics(&self, now: DateTime<Utc>) -> AnalyticsReport {
        let state = self.state.read().await;
        let endpoints: Vec<EndpointDefinition> = state.endpoints.values().cloned().collect();
        let log: Vec<HitEntry> = state.hit_log.iter().cloned().collect();
        summarize(&endpoints, &log, now)
    }
}

#[async_trait]
impl DefinitionLookup for DefinitionCatalog {
    async fn find_endpoint(&self, property: &str, route: &str) -> Option<EndpointDefinition> {
        let state = self.state.read().await;
        let id = state.endpoint_routes.get(&route_key(property, route))?;
        state.endpoints.get(id).cloned()
    }

    async fn find_feed(&self, property: &str, route: &str) -> Option<FeedDefinition> {
        let state = self.state.read().await;
        let id = state.feed_routes.get(&route_key(property, route))?;
        state.feeds.get(id).filter(|feed| feed.is_active).cloned()
    }

    async fn find_provider(&self, id: &str) -> Option<ProviderDefinition> {
        let state = self.state.read().await;
        state.providers.get(id).cloned()
    }

    async fn find_database(&self, id: &str) -> Option<DatabaseConnection> {
        let state = self.state.read().await;
        state.databases.get(id).cloned()
    }
}

#[async_trait]
impl HitRecorder for DefinitionCatalog {
    async fn record(&self, endpoint_id: &str, hit: HitRecord) -> Result<(), HitError> {
        let mut state = self.state.write().await;
        let endpoint = state
            .endpoints
            .get_mut(endpoint_id)
            .ok_or_else(|| HitError::UnknownEndpoint(endpoint_id.to_string()))?;
        endpoint.hit_count += 1;

        state.hit_log.push_back(HitEntry {
            endpoint_id: endpoint_id.to_string(),
            record: hit,
        });
        while state.hit_log.len() > MAX_HIT_LOG {
            state.hit_log.pop_front();
        }
        Ok(())
    }
}
