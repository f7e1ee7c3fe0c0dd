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

//! REST API implementation for ApiForge Server.
//!
//! ## API Structure
//!
//! ```text
//! /health                          - Health check (unversioned)
//! /api/versions                    - List available API versions
//! /api/{property}/{route}          - Resolve a virtual API endpoint (GET, POST)
//! /api/feed/{property}/{route}     - Resolve a feed page
//! /api/v1/apis                     - Endpoint catalog
//! /api/v1/feeds                    - Feed catalog
//! /api/v1/analytics                - Hit analytics
//! /api/v1/providers/{id}/test      - Provider connectivity check
//! ```
//!
//! ## Module Organization
//!
//! - `shared` - Common types and handlers shared across API versions
//! - `v1` - API version 1 implementation
//! - `version` - Version constants and utilities

pub mod shared;
pub mod v1;
pub mod version;

pub use shared::error::*;
pub use shared::responses::*;
pub use shared::ResolutionContext;

pub use v1::handlers::*;
pub use v1::openapi::ApiDocV1;
pub use v1::routes::build_v1_router;

pub use version::{ApiVersion, API_CURRENT_VERSION};
