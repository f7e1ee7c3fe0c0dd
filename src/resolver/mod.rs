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

//! Resolution of endpoint and feed definitions into JSON payloads.

pub mod api;
pub mod error;
pub mod feed;
pub mod key_path;
pub mod rotation;
pub mod template;

pub use api::ApiResolver;
pub use error::{error_payload, ResolveError, StaticBlobError};
pub use feed::{FeedContent, FeedEntry, FeedResolver, FeedResponse, PageWindow};
pub use key_path::{extract, is_truthy, KeyPath};
pub use rotation::rotate;
pub use template::{
    apply_data_map_template, apply_data_map_value, apply_template, apply_template_value,
    Template, TemplateFlavor,
};

use std::future::Future;
use std::time::Duration;

/// Default upper bound on a single provider call or database read.
pub const DEFAULT_RESOLUTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Bound `future` by `limit`, mapping expiry to [`ResolveError::Timeout`].
pub(crate) async fn within<F, T, E>(limit: Duration, future: F) -> Result<T, ResolveError>
where
    F: Future<Output = Result<T, E>>,
    ResolveError: From<E>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result.map_err(ResolveError::from),
        Err(_) => Err(ResolveError::Timeout(limit)),
    }
}
