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

//! Server configuration: settings plus the definition catalog.
//!
//! Configuration files are YAML (JSON is accepted as a fallback). Before
//! parsing, `${VAR}` and `${VAR:-default}` references are replaced from the
//! environment, so provider headers and database URIs can carry secrets
//! without writing them into the file.
//!
//! ```yaml
//! host: "${APIFORGE_HOST:-0.0.0.0}"
//! port: 8080
//! logLevel: info
//! blobStore:
//!   root: ./data/blobs
//! providers:
//!   - id: cms
//!     url: https://cms.example.com/items
//!     headers:
//!       x-api-key: "${CMS_API_KEY}"
//! apis:
//!   - id: home
//!     property: web
//!     route: home
//!     apiType: STATIC
//!     staticResponse: { title: Home }
//! ```

pub mod env_interpolation;
pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{
    from_json_str, from_yaml_str, load_config_file, load_or_create_config_file,
    save_config_file, ConfigError,
};
pub use types::{BlobStoreSettings, ServerConfig};
pub use validation::ValidationError;
