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

//! Configuration validation.
//!
//! Two passes run on load:
//! 1. [`validate_fields`] checks the raw document for unknown keys, which
//!    serde defaults would otherwise silently ignore.
//! 2. [`validate_config`] checks the parsed configuration for invalid
//!    settings, duplicate ids and route collisions. Dangling references are
//!    returned as warnings.

use std::collections::HashSet;

use crate::config::types::ServerConfig;
use crate::models::{DynamicConfig, EndpointKind};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown field '{field}' in {context}. Valid fields are: {valid_fields}")]
    UnknownField {
        field: String,
        context: String,
        valid_fields: String,
    },

    #[error("Invalid configuration:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
}

const SERVER_FIELDS: &[&str] = &[
    "host",
    "port",
    "logLevel",
    "resolutionTimeoutSecs",
    "blobStore",
    "providers",
    "databases",
    "apis",
    "feeds",
];

const BLOB_STORE_FIELDS: &[&str] = &["root", "bucket"];

const PROVIDER_FIELDS: &[&str] = &["id", "name", "method", "url", "headers", "params", "body"];

const DATABASE_FIELDS: &[&str] = &["id", "name", "type", "uri", "database"];

/// Reject keys that no configuration type knows about.
pub fn validate_fields(value: &serde_yaml::Value) -> Result<(), ValidationError> {
    let Some(root) = value.as_mapping() else {
        return Ok(());
    };

    let mut problems = Vec::new();
    unknown_keys(root, SERVER_FIELDS, "server configuration", &mut problems);

    if let Some(blob_store) = root.get("blobStore").and_then(|v| v.as_mapping()) {
        unknown_keys(blob_store, BLOB_STORE_FIELDS, "blobStore", &mut problems);
    }
    check_list(root.get("providers"), PROVIDER_FIELDS, "provider", &mut problems);
    check_list(root.get("databases"), DATABASE_FIELDS, "database", &mut problems);

    match problems.len() {
        0 => Ok(()),
        1 => Err(problems.remove(0)),
        _ => Err(ValidationError::Invalid(
            problems.iter().map(ToString::to_string).collect(),
        )),
    }
}

fn check_list(
    list: Option<&serde_yaml::Value>,
    valid_fields: &[&str],
    kind: &str,
    problems: &mut Vec<ValidationError>,
) {
    let Some(entries) = list.and_then(|v| v.as_sequence()) else {
        return;
    };
    for (i, entry) in entries.iter().enumerate() {
        if let Some(map) = entry.as_mapping() {
            let id = map.get("id").and_then(|v| v.as_str()).unwrap_or("unknown");
            unknown_keys(map, valid_fields, &format!("{kind}[{i}] (id={id})"), problems);
        }
    }
}

fn unknown_keys(
    map: &serde_yaml::Mapping,
    valid_fields: &[&str],
    context: &str,
    problems: &mut Vec<ValidationError>,
) {
    for key in map.keys().filter_map(|k| k.as_str()) {
        if !valid_fields.contains(&key) {
            problems.push(ValidationError::UnknownField {
                field: key.to_string(),
                context: context.to_string(),
                valid_fields: valid_fields.join(", "),
            });
        }
    }
}

/// Check settings and catalog consistency. Returns warnings on success.
pub fn validate_config(config: &ServerConfig) -> Result<Vec<String>, ValidationError> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if config.port == 0 {
        errors.push("Invalid port: 0".to_string());
    }
    if config.host.trim().is_empty() {
        errors.push("Host cannot be empty".to_string());
    }
    if config.resolution_timeout_secs == 0 {
        errors.push("resolutionTimeoutSecs must be greater than 0".to_string());
    }
    if config.blob_store.bucket.trim().is_empty() {
        errors.push("blobStore.bucket cannot be empty".to_string());
    }

    duplicate_ids("provider", config.providers.iter().map(|p| p.id.as_str()), &mut errors);
    duplicate_ids("database", config.databases.iter().map(|d| d.id.as_str()), &mut errors);
    duplicate_ids("API", config.apis.iter().map(|a| a.id.as_str()), &mut errors);
    duplicate_ids("feed", config.feeds.iter().map(|f| f.id.as_str()), &mut errors);

    duplicate_routes(
        "API",
        config.apis.iter().map(|a| (a.property.as_str(), a.route.as_str())),
        &mut errors,
    );
    duplicate_routes(
        "feed",
        config.feeds.iter().map(|f| (f.property.as_str(), f.route.as_str())),
        &mut errors,
    );

    for provider in &config.providers {
        match reqwest::Url::parse(&provider.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!(
                "Provider '{}' has unsupported URL scheme '{}'",
                provider.id,
                url.scheme()
            )),
            Err(e) => errors.push(format!(
                "Provider '{}' has invalid URL '{}': {e}",
                provider.id, provider.url
            )),
        }
    }

    let provider_ids: HashSet<&str> = config.providers.iter().map(|p| p.id.as_str()).collect();
    let database_ids: HashSet<&str> = config.databases.iter().map(|d| d.id.as_str()).collect();

    for api in &config.apis {
        if api.property.is_empty() || api.route.is_empty() {
            errors.push(format!("API '{}' needs both property and route", api.id));
        }
        match &api.kind {
            EndpointKind::Dynamic(source) => match &source.dynamic_config {
                Some(DynamicConfig::Api(cfg)) if !provider_ids.contains(cfg.provider_id.as_str()) => {
                    warnings.push(format!(
                        "API '{}' references unknown provider '{}'",
                        api.id, cfg.provider_id
                    ));
                }
                Some(DynamicConfig::Database(cfg))
                    if !database_ids.contains(cfg.database_config_id.as_str()) =>
                {
                    warnings.push(format!(
                        "API '{}' references unknown database '{}'",
                        api.id, cfg.database_config_id
                    ));
                }
                None => warnings.push(format!("API '{}' is DYNAMIC without dynamicConfig", api.id)),
                _ => {}
            },
            EndpointKind::Static(_) => {}
        }
    }

    for database in &config.databases {
        if database.kind().is_none() {
            warnings.push(format!(
                "Database '{}' has unknown type '{}'",
                database.id, database.kind
            ));
        }
    }

    for feed in &config.feeds {
        if feed.property.is_empty() || feed.route.is_empty() {
            errors.push(format!("Feed '{}' needs both property and route", feed.id));
        }
        if let Some(provider_id) = feed.provider_id.as_deref().filter(|id| !id.is_empty()) {
            if !provider_ids.contains(provider_id) {
                warnings.push(format!(
                    "Feed '{}' references unknown provider '{provider_id}'",
                    feed.id
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ValidationError::Invalid(errors))
    }
}

fn duplicate_ids<'a>(kind: &str, ids: impl Iterator<Item = &'a str>, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for id in ids {
        if id.is_empty() {
            errors.push(format!("A {kind} is missing its id"));
        } else if !seen.insert(id) {
            errors.push(format!("Duplicate {kind} id '{id}'"));
        }
    }
}

fn duplicate_routes<'a>(
    kind: &str,
    routes: impl Iterator<Item = (&'a str, &'a str)>,
    errors: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    for (property, route) in routes {
        if !seen.insert((property, route)) {
            errors.push(format!("Duplicate {kind} route '{property}/{route}'"));
        }
    }
}
