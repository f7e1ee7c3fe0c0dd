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

//! Resolution of feeds: paginated provider fetch, per-item templating and
//! ad interleaving, wrapped in the feed envelope.

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, error, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use super::error::{error_payload, ResolveError};
use super::key_path::{is_truthy, KeyPath};
use super::template::{Template, TemplateFlavor};
use super::{within, DEFAULT_RESOLUTION_TIMEOUT};
use crate::catalog::DefinitionLookup;
use crate::models::{AdConfig, FeedDefinition, ItemTemplate, Pagination};
use crate::provider_client::ProviderClient;

const FALLBACK_LIMIT: u64 = 20;
const AD_CONTENT_ID: &str = "AD_UNIT_CONTENT";
const AD_CONTENT_TYPE: &str = "ad_unit_content";

/// The skip/limit window requested by a feed caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub limit: u64,
}

impl PageWindow {
    pub fn from_query(pagination: &Pagination, query: &HashMap<String, String>) -> Self {
        let skip = query
            .get(pagination.skip_param())
            .and_then(|raw| parse_leading_int(raw))
            .unwrap_or(0);

        let default_limit = match pagination.default_limit {
            0 => FALLBACK_LIMIT,
            n => u64::from(n),
        };
        let limit = query
            .get(pagination.limit_param())
            .and_then(|raw| parse_leading_int(raw))
            .filter(|limit| *limit > 0)
            .unwrap_or(default_limit);

        Self { skip, limit }
    }
}

/// Parse the leading decimal digits of `raw`, ignoring leading whitespace and
/// an optional `+`. Signed or non-numeric input yields `None`.
fn parse_leading_int(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse().ok()
}

/// One entry of a feed page, either content or an ad slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub position: u32,
    pub component_id: u32,
    pub content_provider: u32,
    pub content: FeedContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedContent {
    pub id: Value,
    pub property_id: Option<String>,
    #[serde(rename = "type")]
    pub content_type: String,
    pub date_modified: Value,
    pub categories: Vec<Value>,
    pub category_label: Option<String>,
    pub category_slug: Option<String>,
    pub tags: Option<Vec<String>>,
    pub data_map: Value,
    pub bookmarked: bool,
}

impl FeedContent {
    fn new(id: Value, content_type: String, date_modified: Value, data_map: Value) -> Self {
        Self {
            id,
            property_id: None,
            content_type,
            date_modified,
            categories: Vec::new(),
            category_label: None,
            category_slug: None,
            tags: None,
            data_map,
            bookmarked: false,
        }
    }
}

impl FeedEntry {
    fn ad(position: u32, ads: &AdConfig, date_modified: &str) -> Self {
        Self {
            position,
            component_id: ads.component_id,
            content_provider: ads.content_provider,
            content: FeedContent::new(
                Value::String(AD_CONTENT_ID.to_string()),
                AD_CONTENT_TYPE.to_string(),
                Value::String(date_modified.to_string()),
                ads.ad_content.clone(),
            ),
        }
    }

    fn content(position: u32, template: &ItemTemplate, item: &Value, data_map: Value) -> Self {
        let id = non_null_field(item, "id")
            .cloned()
            .unwrap_or_else(|| Value::String(position.to_string()));
        let date_modified = non_null_field(item, "updated_at")
            .or_else(|| non_null_field(item, "dateModified"))
            .cloned()
            .unwrap_or(Value::Null);

        Self {
            position,
            component_id: template.component_id,
            content_provider: template.content_provider,
            content: FeedContent::new(id, template.content_type.clone(), date_modified, data_map),
        }
    }
}

fn non_null_field<'a>(item: &'a Value, key: &str) -> Option<&'a Value> {
    item.get(key).filter(|value| !value.is_null())
}

/// Interleave ad entries with templated content entries.
///
/// `position` counts output entries from 1. Before each content entry, every
/// consecutive ad slot at the current position is filled, so each listed
/// position yields exactly one ad as long as content remains to follow it.
pub fn interleave(feed: &FeedDefinition, source_items: &[Value], now: DateTime<Utc>) -> Vec<FeedEntry> {
    let ad_positions: HashSet<u32> = feed.ad_config.active_positions().iter().copied().collect();
    let data_map = Template::compile_map(
        &feed.item_template.data_map_template,
        TemplateFlavor::Embedded,
    );
    let ad_timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut entries = Vec::with_capacity(source_items.len() + ad_positions.len());
    let mut position: u32 = 1;
    for item in source_items {
        while ad_positions.contains(&position) {
            entries.push(FeedEntry::ad(position, &feed.ad_config, &ad_timestamp));
            position += 1;
        }
        entries.push(FeedEntry::content(
            position,
            &feed.item_template,
            item,
            data_map.render(item),
        ));
        position += 1;
    }
    entries
}

/// A resolved feed page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub feed_id: Value,
    pub feed_version_id: Value,
    pub user_id: Value,
    pub session_id: Value,
    pub page_id: Value,
    pub page_no: Value,
    pub items: Vec<FeedEntry>,
    pub feed_title: Value,
    pub sticky_ads: Value,
    pub interstitial_ads: Value,
    pub ga_events: Value,
}

impl FeedResponse {
    pub fn assemble(feed: &FeedDefinition, items: Vec<FeedEntry>) -> Self {
        let meta = &feed.feed_meta;
        Self {
            feed_id: truthy_or(&meta.feed_id, Value::Null),
            feed_version_id: truthy_or(&meta.feed_version_id, Value::Null),
            user_id: truthy_or(&meta.user_id, Value::Null),
            session_id: truthy_or(&meta.session_id, Value::Null),
            page_id: truthy_or(&meta.page_id, Value::Null),
            page_no: truthy_or(&meta.page_no, json!(1)),
            items,
            feed_title: truthy_or(&meta.feed_title, Value::Null),
            sticky_ads: truthy_or(&feed.sticky_ads, Value::Null),
            interstitial_ads: truthy_or(&feed.interstitial_ads, Value::Null),
            ga_events: truthy_or(&feed.ga_events, Value::Null),
        }
    }
}

fn truthy_or(value: &Option<Value>, fallback: Value) -> Value {
    match value {
        Some(v) if is_truthy(v) => v.clone(),
        _ => fallback,
    }
}

/// Turns a [`FeedDefinition`] plus caller query into a feed page.
#[derive(Clone)]
pub struct FeedResolver {
    definitions: Arc<dyn DefinitionLookup>,
    provider_client: Arc<dyn ProviderClient>,
    timeout: Duration,
}

impl FeedResolver {
    pub fn new(
        definitions: Arc<dyn DefinitionLookup>,
        provider_client: Arc<dyn ProviderClient>,
    ) -> Self {
        Self {
            definitions,
            provider_client,
            timeout: DEFAULT_RESOLUTION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve a feed page. Never fails: any error becomes `{"error": ...}`.
    pub async fn resolve(&self, feed: &FeedDefinition, query: &HashMap<String, String>) -> Value {
        match self.try_resolve(feed, query).await {
            Ok(response) => response,
            Err(err) => {
                error!("Feed '{}' failed to resolve: {err}", feed.id);
                error_payload(err.to_string())
            }
        }
    }

    async fn try_resolve(
        &self,
        feed: &FeedDefinition,
        query: &HashMap<String, String>,
    ) -> Result<Value, ResolveError> {
        let items = match feed.provider_id.as_deref() {
            Some(provider_id) if !provider_id.is_empty() => {
                let source_items = self.fetch_items(feed, provider_id, query).await?;
                interleave(feed, &source_items, Utc::now())
            }
            _ => Vec::new(),
        };

        Ok(serde_json::to_value(FeedResponse::assemble(feed, items))?)
    }

    async fn fetch_items(
        &self,
        feed: &FeedDefinition,
        provider_id: &str,
        query: &HashMap<String, String>,
    ) -> Result<Vec<Value>, ResolveError> {
        let provider = self
            .definitions
            .find_provider(provider_id)
            .await
            .ok_or(ResolveError::ProviderNotFound)?;

        let page = PageWindow::from_query(&feed.pagination, query);
        debug!(
            "Feed '{}': fetching skip={} limit={} from provider '{provider_id}'",
            feed.id, page.skip, page.limit
        );
        let paged = provider.with_params([
            (feed.pagination.skip_param().to_string(), json!(page.skip)),
            (feed.pagination.limit_param().to_string(), json!(page.limit)),
        ]);

        let response = within(self.timeout, self.provider_client.call(&paged)).await?;
        Ok(extract_items(response, &feed.response_key_path, &feed.id))
    }
}

/// The item array at `path`, or empty when the response holds no array there.
fn extract_items(response: Value, path: &str, feed_id: &str) -> Vec<Value> {
    let extracted = if path.is_empty() {
        Some(response)
    } else {
        KeyPath::parse(path).resolve(&response).cloned()
    };

    match extracted {
        Some(Value::Array(items)) => items,
        other => {
            warn!(
                "Feed '{feed_id}': response at '{path}' is not an array ({}), using no items",
                describe(other.as_ref())
            );
            Vec::new()
        }
    }
}

fn describe(value: Option<&Value>) -> &'static str {
    match value {
        None | Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}
