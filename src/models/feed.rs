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
use serde_json::{Map, Value};

/// A paginated, templated, ad-interleaved list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub property: String,
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub response_key_path: String,
    #[serde(default)]
    pub feed_meta: FeedMeta,
    #[serde(default)]
    pub item_template: ItemTemplate,
    #[serde(default)]
    pub ad_config: AdConfig,
    #[serde(default)]
    pub interstitial_ads: Option<Value>,
    #[serde(default)]
    pub sticky_ads: Option<Value>,
    #[serde(default)]
    pub ga_events: Option<Value>,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Envelope fields copied into every feed response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedMeta {
    #[serde(default)]
    pub feed_id: Option<Value>,
    #[serde(default)]
    pub feed_version_id: Option<Value>,
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub session_id: Option<Value>,
    #[serde(default)]
    pub page_id: Option<Value>,
    #[serde(default)]
    pub page_no: Option<Value>,
    #[serde(default)]
    pub feed_title: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTemplate {
    #[serde(default = "default_item_component_id")]
    pub component_id: u32,
    #[serde(default = "default_item_content_provider")]
    pub content_provider: u32,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub data_map_template: Map<String, Value>,
}

impl Default for ItemTemplate {
    fn default() -> Self {
        Self {
            component_id: default_item_component_id(),
            content_provider: default_item_content_provider(),
            content_type: default_content_type(),
            data_map_template: Map::new(),
        }
    }
}

fn default_item_component_id() -> u32 {
    108
}

fn default_item_content_provider() -> u32 {
    1
}

fn default_content_type() -> String {
    "video".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdConfig {
    #[serde(default)]
    pub enabled: bool,
    /// 1-based output positions that receive an ad entry.
    #[serde(default)]
    pub positions: Vec<u32>,
    #[serde(default = "default_ad_component_id")]
    pub component_id: u32,
    #[serde(default = "default_ad_content_provider")]
    pub content_provider: u32,
    #[serde(default = "empty_object")]
    pub ad_content: Value,
}

impl Default for AdConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            positions: Vec::new(),
            component_id: default_ad_component_id(),
            content_provider: default_ad_content_provider(),
            ad_content: empty_object(),
        }
    }
}

impl AdConfig {
    /// Positions that are live, i.e. empty unless ads are enabled.
    pub fn active_positions(&self) -> &[u32] {
        if self.enabled {
            &self.positions
        } else {
            &[]
        }
    }
}

fn default_ad_component_id() -> u32 {
    12
}

fn default_ad_content_provider() -> u32 {
    4
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Names of the paging query parameters and the fallback page size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "default_skip_param")]
    pub skip_param: String,
    #[serde(default = "default_limit_param")]
    pub limit_param: String,
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip_param: default_skip_param(),
            limit_param: default_limit_param(),
            default_limit: default_limit(),
        }
    }
}

impl Pagination {
    pub fn skip_param(&self) -> &str {
        non_empty_or(&self.skip_param, "skip")
    }

    pub fn limit_param(&self) -> &str {
        non_empty_or(&self.limit_param, "limit")
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn default_skip_param() -> String {
    "skip".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_limit() -> u32 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_feed_gets_defaults() {
        let feed: FeedDefinition = serde_yaml::from_str(
            r#"
id: shorts
property: web-id
route: shorts
"#,
        )
        .unwrap();

        assert!(feed.is_active);
        assert!(feed.provider_id.is_none());
        assert_eq!(feed.item_template.component_id, 108);
        assert_eq!(feed.item_template.content_provider, 1);
        assert_eq!(feed.item_template.content_type, "video");
        assert_eq!(feed.ad_config.component_id, 12);
        assert_eq!(feed.ad_config.content_provider, 4);
        assert_eq!(feed.ad_config.ad_content, json!({}));
        assert_eq!(feed.pagination.skip_param(), "skip");
        assert_eq!(feed.pagination.limit_param(), "limit");
        assert_eq!(feed.pagination.default_limit, 20);
    }

    #[test]
    fn test_empty_pagination_names_fall_back() {
        let pagination = Pagination {
            skip_param: String::new(),
            limit_param: String::new(),
            default_limit: 10,
        };
        assert_eq!(pagination.skip_param(), "skip");
        assert_eq!(pagination.limit_param(), "limit");
    }

    #[test]
    fn test_disabled_ads_have_no_positions() {
        let mut ads = AdConfig {
            positions: vec![2, 4],
            ..AdConfig::default()
        };
        assert!(ads.active_positions().is_empty());

        ads.enabled = true;
        assert_eq!(ads.active_positions(), &[2, 4]);
    }
}
