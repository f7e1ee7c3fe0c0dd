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

use super::HttpMethod;

/// A virtual API endpoint, addressed by `(property, route)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDefinition {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub property: String,
    pub route: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// `0` and `1` leave the payload as is; larger values repeat it.
    #[serde(default = "default_rotation")]
    pub rotation: u32,
    #[serde(default)]
    pub hit_count: u64,
    #[serde(flatten)]
    pub kind: EndpointKind,
}

fn default_rotation() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "apiType", rename_all = "UPPERCASE")]
pub enum EndpointKind {
    Static(StaticSource),
    Dynamic(DynamicSource),
}

impl EndpointKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            EndpointKind::Static(_) => "STATIC",
            EndpointKind::Dynamic(_) => "DYNAMIC",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_response: Option<Value>,
    /// Key of an oversized payload kept in the blob store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_blob_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_config: Option<DynamicConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum DynamicConfig {
    Api(ApiSourceConfig),
    Database(DatabaseSourceConfig),
}

/// Data fetched from an external provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSourceConfig {
    #[serde(default)]
    pub provider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_key_path: Option<String>,
    /// Fixed fields merged around the fetched data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_data: Option<Map<String, Value>>,
    /// Key under which the fetched data is nested in the merged object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_data_key: Option<String>,
    /// Per-item template applied when the fetched data is an array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_data_template: Option<Map<String, Value>>,
}

/// Data read from a database collection or table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSourceConfig {
    #[serde(default)]
    pub database_config_id: String,
    /// Mongo collection or MySQL table.
    #[serde(default, alias = "table")]
    pub collection: String,
    #[serde(default)]
    pub query: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_endpoint_from_yaml() {
        let yaml = r#"
id: home
property: web-id
route: home
apiType: STATIC
staticResponse:
  title: Home
  sections: [1, 2]
"#;
        let endpoint: EndpointDefinition = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(endpoint.rotation, 1);
        assert_eq!(endpoint.method, HttpMethod::Get);
        assert_eq!(
            endpoint.kind,
            EndpointKind::Static(StaticSource {
                static_response: Some(json!({"title": "Home", "sections": [1, 2]})),
                static_blob_key: None,
            })
        );
    }

    #[test]
    fn test_dynamic_api_endpoint_from_yaml() {
        let yaml = r#"
id: videos
property: web-id
route: videos
apiType: DYNAMIC
rotation: 3
dynamicConfig:
  type: API
  providerId: cms
  responseKeyPath: data.items
  dynamicDataKey: items
  staticData:
    type: carousel
  dynamicDataTemplate:
    title: "{{headline}}"
"#;
        let endpoint: EndpointDefinition = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(endpoint.rotation, 3);
        let EndpointKind::Dynamic(DynamicSource {
            dynamic_config: Some(DynamicConfig::Api(config)),
        }) = endpoint.kind
        else {
            panic!("expected dynamic API config");
        };
        assert_eq!(config.provider_id, "cms");
        assert_eq!(config.response_key_path.as_deref(), Some("data.items"));
        assert_eq!(config.dynamic_data_key.as_deref(), Some("items"));
        assert_eq!(
            config.static_data,
            Some(json!({"type": "carousel"}).as_object().cloned().unwrap())
        );
    }

    #[test]
    fn test_dynamic_database_endpoint_accepts_table_alias() {
        let value = json!({
            "id": "orders",
            "property": "shop",
            "route": "orders",
            "apiType": "DYNAMIC",
            "dynamicConfig": {
                "type": "DATABASE",
                "databaseConfigId": "main-db",
                "table": "orders",
                "query": {"status": "open"}
            }
        });
        let endpoint: EndpointDefinition = serde_json::from_value(value).unwrap();

        let EndpointKind::Dynamic(DynamicSource {
            dynamic_config: Some(DynamicConfig::Database(config)),
        }) = endpoint.kind
        else {
            panic!("expected dynamic database config");
        };
        assert_eq!(config.database_config_id, "main-db");
        assert_eq!(config.collection, "orders");
        assert_eq!(config.query.get("status"), Some(&json!("open")));
    }

    #[test]
    fn test_dynamic_endpoint_without_config() {
        let endpoint: EndpointDefinition = serde_json::from_value(json!({
            "id": "x",
            "property": "p",
            "route": "r",
            "apiType": "DYNAMIC"
        }))
        .unwrap();
        assert_eq!(endpoint.kind, EndpointKind::Dynamic(DynamicSource::default()));
        assert_eq!(endpoint.kind.type_name(), "DYNAMIC");
    }

    #[test]
    fn test_unknown_api_type_is_rejected() {
        let result: Result<EndpointDefinition, _> = serde_json::from_value(json!({
            "id": "x",
            "property": "p",
            "route": "r",
            "apiType": "GRAPHQL"
        }));
        assert!(result.is_err());
    }
}
