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

//! Loading configuration files with environment interpolation and validation.

use log::{info, warn};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use super::env_interpolation::{self, InterpolationError};
use super::types::ServerConfig;
use super::validation::{self, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Environment variable interpolation failed: {0}")]
    Interpolation(#[from] InterpolationError),

    #[error("Failed to parse config file '{path}': YAML error: {yaml_err}, JSON error: {json_err}")]
    Parse {
        path: String,
        yaml_err: String,
        json_err: String,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Deserialize YAML after environment interpolation.
pub fn from_yaml_str<T: DeserializeOwned>(s: &str) -> Result<T, ConfigError> {
    let interpolated = env_interpolation::interpolate(s)?;
    Ok(serde_yaml::from_str(&interpolated)?)
}

/// Deserialize JSON after environment interpolation.
pub fn from_json_str<T: DeserializeOwned>(s: &str) -> Result<T, ConfigError> {
    let interpolated = env_interpolation::interpolate(s)?;
    Ok(serde_json::from_str(&interpolated)?)
}

/// Load and validate a server configuration file.
///
/// The text is interpolated, parsed as YAML (falling back to JSON), checked
/// for unknown keys, deserialized and then validated. Validation warnings are
/// logged.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<ServerConfig, ConfigError> {
    let path_ref = path.as_ref();
    let content = fs::read_to_string(path_ref)?;
    let interpolated = env_interpolation::interpolate(&content)?;

    let document = match serde_yaml::from_str::<serde_yaml::Value>(&interpolated) {
        Ok(document) => document,
        Err(yaml_err) => match serde_json::from_str::<serde_yaml::Value>(&interpolated) {
            Ok(document) => document,
            Err(json_err) => {
                return Err(ConfigError::Parse {
                    path: path_ref.display().to_string(),
                    yaml_err: yaml_err.to_string(),
                    json_err: json_err.to_string(),
                });
            }
        },
    };

    let document = match document {
        serde_yaml::Value::Null => serde_yaml::Value::Mapping(serde_yaml::Mapping::new()),
        other => other,
    };

    validation::validate_fields(&document)?;
    let config: ServerConfig = serde_yaml::from_value(document)?;

    for warning in validation::validate_config(&config)? {
        warn!("{}: {warning}", path_ref.display());
    }

    Ok(config)
}

/// Load `path`, writing a default configuration there first if it is absent.
pub fn load_or_create_config_file<P: AsRef<Path>>(path: P) -> Result<ServerConfig, ConfigError> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        info!(
            "Config file '{}' not found, writing default configuration",
            path_ref.display()
        );
        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        save_config_file(&ServerConfig::default(), path_ref)?;
    }
    load_config_file(path_ref)
}

/// Write `config` as YAML. Environment references are not preserved.
pub fn save_config_file<P: AsRef<Path>>(config: &ServerConfig, path: P) -> Result<(), ConfigError> {
    let content = serde_yaml::to_string(config)?;
    Ok(fs::write(path, content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndpointKind, HttpMethod};
    use serial_test::serial;
    use std::env;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_temp(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_catalog() {
        let file = write_temp(
            r#"
host: 127.0.0.1
port: 9000
providers:
  - id: cms
    url: https://cms.example.com/items
apis:
  - id: home
    property: web
    route: home
    apiType: STATIC
    staticResponse: { title: Home }
"#,
            ".yaml",
        );

        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.providers[0].method, HttpMethod::Get);
        assert!(matches!(config.apis[0].kind, EndpointKind::Static(_)));
        assert_eq!(config.resolution_timeout_secs, 30);
    }

    #[test]
    fn test_load_json_config() {
        let file = write_temp(r#"{"port": 7070, "feeds": []}"#, ".json");
        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config.port, 7070);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_temp("", ".yaml");
        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    #[serial]
    fn test_env_references_are_interpolated() {
        env::set_var("APIFORGE_LOADER_KEY", "s3cret");
        let file = write_temp(
            r#"
providers:
  - id: cms
    url: "${APIFORGE_LOADER_URL:-https://cms.example.com}"
    headers:
      x-api-key: "${APIFORGE_LOADER_KEY}"
"#,
            ".yaml",
        );

        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config.providers[0].url, "https://cms.example.com");
        assert_eq!(config.providers[0].headers["x-api-key"], "s3cret");
        env::remove_var("APIFORGE_LOADER_KEY");
    }

    #[test]
    #[serial]
    fn test_missing_env_reference_fails() {
        env::remove_var("APIFORGE_LOADER_ABSENT");
        let file = write_temp("host: ${APIFORGE_LOADER_ABSENT}\n", ".yaml");
        assert!(matches!(
            load_config_file(file.path()),
            Err(ConfigError::Interpolation(_))
        ));
    }

    #[test]
    fn test_unknown_field_fails() {
        let file = write_temp("host: 0.0.0.0\nlisten: 80\n", ".yaml");
        assert!(matches!(
            load_config_file(file.path()),
            Err(ConfigError::Validation(ValidationError::UnknownField { .. }))
        ));
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("apiforge.yaml");

        let config = load_or_create_config_file(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let config = ServerConfig {
            port: 8181,
            ..ServerConfig::default()
        };

        save_config_file(&config, &path).unwrap();
        assert_eq!(load_config_file(&path).unwrap().port, 8181);
    }
}
