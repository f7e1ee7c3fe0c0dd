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

//! Feed Resolution Tests
//!
//! Drive `FeedResolver` through a mock provider and check the assembled
//! feed page: pagination injection, item mapping, ad placement and the
//! envelope fields.

#![allow(clippy::unwrap_used)]

mod test_support;

use test_support::{feed, provider, MockProviderClient};

use apiforge_server::catalog::DefinitionLookup;
use apiforge_server::resolver::FeedResolver;
use apiforge_server::DefinitionCatalog;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

fn video_feed() -> Value {
    json!({
        "id": "f1",
        "name": "Home videos",
        "property": "web-id",
        "route": "home",
        "providerId": "videos",
        "responseKeyPath": "data.items",
        "feedMeta": {
            "feedId": "feed-42",
            "sessionId": "s-1",
            "feedTitle": "Top videos",
            "pageNo": 0
        },
        "itemTemplate": {
            "componentId": 108,
            "contentProvider": 1,
            "contentType": "video",
            "dataMapTemplate": {
                "title": "{{title}}",
                "thumbnail": "https://img.example.com/{{id}}_{{missing}}.jpg",
                "duration": "{{meta.duration}}"
            }
        },
        "adConfig": {
            "enabled": true,
            "positions": [2],
            "componentId": 12,
            "contentProvider": 4,
            "adContent": {"slot": "mid"}
        },
        "stickyAds": {"bottom": true},
        "pagination": {"skipParam": "offset", "limitParam": "size", "defaultLimit": 10}
    })
}

fn three_items() -> Value {
    json!({
        "data": {
            "items": [
                {"id": "v1", "title": "One", "meta": {"duration": 30}, "updated_at": "2024-01-01"},
                {"id": "v2", "title": "Two", "dateModified": "2024-02-02"},
                {"title": "Three"}
            ]
        }
    })
}

async fn resolver_with(client: &MockProviderClient) -> FeedResolver {
    let catalog = DefinitionCatalog::new();
    catalog
        .add_provider(provider("videos", "https://cms.example.com/videos"))
        .await
        .unwrap();
    FeedResolver::new(Arc::new(catalog), Arc::new(client.clone()))
}

fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_ad_shifts_following_content() {
    let client = MockProviderClient::new().with_response("videos", three_items());
    let resolver = resolver_with(&client).await;

    let page = resolver.resolve(&feed(video_feed()), &HashMap::new()).await;

    let items = page["items"].as_array().unwrap();
    let summary: Vec<(u64, &str)> = items
        .iter()
        .map(|e| {
            (
                e["position"].as_u64().unwrap(),
                e["content"]["type"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, "video"),
            (2, "ad_unit_content"),
            (3, "video"),
            (4, "video")
        ]
    );

    let ad = &items[1];
    assert_eq!(ad["componentId"], json!(12));
    assert_eq!(ad["contentProvider"], json!(4));
    assert_eq!(ad["content"]["id"], json!("AD_UNIT_CONTENT"));
    assert_eq!(ad["content"]["dataMap"], json!({"slot": "mid"}));
}

#[tokio::test]
async fn test_content_entries_are_mapped_through_template() {
    let client = MockProviderClient::new().with_response("videos", three_items());
    let resolver = resolver_with(&client).await;

    let page = resolver.resolve(&feed(video_feed()), &HashMap::new()).await;
    let items = page["items"].as_array().unwrap();

    let first = &items[0];
    assert_eq!(first["componentId"], json!(108));
    assert_eq!(first["content"]["id"], json!("v1"));
    assert_eq!(first["content"]["dateModified"], json!("2024-01-01"));
    assert_eq!(
        first["content"]["dataMap"],
        json!({
            "title": "One",
            "thumbnail": "https://img.example.com/v1_.jpg",
            "duration": 30
        })
    );
    assert_eq!(first["content"]["bookmarked"], json!(false));
    assert_eq!(first["content"]["categories"], json!([]));

    assert_eq!(items[2]["content"]["dateModified"], json!("2024-02-02"));

    // No id on the source item: the output position stands in.
    let third = &items[3];
    assert_eq!(third["content"]["id"], json!("4"));
    assert_eq!(third["content"]["dataMap"]["duration"], Value::Null);
}

#[tokio::test]
async fn test_envelope_copies_meta_and_passthrough_fields() {
    let client = MockProviderClient::new().with_response("videos", three_items());
    let resolver = resolver_with(&client).await;

    let page = resolver.resolve(&feed(video_feed()), &HashMap::new()).await;

    assert_eq!(page["feedId"], json!("feed-42"));
    assert_eq!(page["sessionId"], json!("s-1"));
    assert_eq!(page["feedTitle"], json!("Top videos"));
    assert_eq!(page["pageNo"], json!(1));
    assert_eq!(page["userId"], Value::Null);
    assert_eq!(page["stickyAds"], json!({"bottom": true}));
    assert_eq!(page["interstitialAds"], Value::Null);
    assert_eq!(page["gaEvents"], Value::Null);
}

#[tokio::test]
async fn test_pagination_is_injected_into_provider_params() {
    let client = MockProviderClient::new().with_response("videos", three_items());
    let catalog = DefinitionCatalog::new();
    let mut videos = provider("videos", "https://cms.example.com/videos");
    videos.params.insert("offset".to_string(), json!(99));
    videos.params.insert("lang".to_string(), json!("en"));
    catalog.add_provider(videos).await.unwrap();
    let resolver = FeedResolver::new(Arc::new(catalog), Arc::new(client.clone()));

    resolver
        .resolve(&feed(video_feed()), &query(&[("offset", "40"), ("size", "abc")]))
        .await;

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    let params = &calls[0].params;
    assert_eq!(params["offset"], json!(40));
    assert_eq!(params["size"], json!(10));
    assert_eq!(params["lang"], json!("en"));
}

#[tokio::test]
async fn test_default_param_names_and_limit() {
    let client = MockProviderClient::new().with_response("videos", json!([]));
    let resolver = resolver_with(&client).await;

    let definition = feed(json!({
        "id": "f2",
        "property": "web-id",
        "route": "plain",
        "providerId": "videos"
    }));
    let page = resolver.resolve(&definition, &query(&[("limit", "5")])).await;

    assert_eq!(page["items"], json!([]));
    let params = &client.calls()[0].params;
    assert_eq!(params["skip"], json!(0));
    assert_eq!(params["limit"], json!(5));
}

#[tokio::test]
async fn test_feed_without_provider_returns_empty_envelope() {
    let client = MockProviderClient::new();
    let resolver = resolver_with(&client).await;

    let mut definition = video_feed();
    definition.as_object_mut().unwrap().remove("providerId");
    let page = resolver.resolve(&feed(definition), &HashMap::new()).await;

    assert_eq!(page["items"], json!([]));
    assert_eq!(page["feedId"], json!("feed-42"));
    assert!(page.get("error").is_none());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_non_array_response_yields_no_items() {
    let client = MockProviderClient::new().with_response("videos", json!({"data": {"items": {}}}));
    let resolver = resolver_with(&client).await;

    let page = resolver.resolve(&feed(video_feed()), &HashMap::new()).await;

    assert_eq!(page["items"], json!([]));
    assert!(page.get("error").is_none());
}

#[tokio::test]
async fn test_missing_provider_yields_error_payload() {
    let client = MockProviderClient::new();
    let resolver = FeedResolver::new(Arc::new(DefinitionCatalog::new()), Arc::new(client));

    let page = resolver.resolve(&feed(video_feed()), &HashMap::new()).await;
    assert_eq!(page, json!({"error": "Provider not found"}));
}

#[tokio::test]
async fn test_upstream_failure_yields_error_payload() {
    let client = MockProviderClient::new().with_failure("videos", 502);
    let resolver = resolver_with(&client).await;

    let page = resolver.resolve(&feed(video_feed()), &HashMap::new()).await;

    let message = page["error"].as_str().unwrap();
    assert!(message.starts_with("External API failed"), "{message}");
    assert!(page.get("items").is_none());
}

#[tokio::test]
async fn test_inactive_feed_is_not_found() {
    let catalog = DefinitionCatalog::new();
    let mut definition = video_feed();
    definition["isActive"] = json!(false);
    catalog.add_feed(feed(definition)).await.unwrap();

    assert!(catalog.find_feed("web-id", "home").await.is_none());
    assert_eq!(catalog.list_feeds().await.len(), 1);
}
