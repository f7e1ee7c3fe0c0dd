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

//! Outbound calls to configured providers.
//!
//! A provider is a stored HTTP request definition. [`HttpProviderClient`]
//! issues it with `reqwest` and returns the parsed JSON body. A single attempt
//! is made per call; any non-2xx status fails the call.

use async_trait::async_trait;
use indexmap::IndexMap;
use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use utoipa::ToSchema;

use crate::models::{HttpMethod, ProviderDefinition};

const ERROR_BODY_SNIPPET: usize = 200;
const PROBE_PREVIEW_LIMIT: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("External API failed: invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("External API failed: invalid header '{name}'")]
    InvalidHeader { name: String },

    #[error("External API failed: request timed out")]
    Timeout,

    #[error("External API failed: {0}")]
    Transport(String),

    #[error("External API failed: HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("External API failed: response is not valid JSON: {0}")]
    InvalidBody(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// The request half of a probe report, as it would be sent.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProbeRequest {
    pub method: HttpMethod,
    pub url: String,
    #[schema(value_type = Object)]
    pub headers: IndexMap<String, String>,
    #[schema(value_type = Object)]
    pub params: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub body: Option<Value>,
}

impl From<&ProviderDefinition> for ProbeRequest {
    fn from(provider: &ProviderDefinition) -> Self {
        Self {
            method: provider.method,
            url: provider.url.clone(),
            headers: provider.headers.clone(),
            params: match provider.method {
                HttpMethod::Get => provider.params.clone(),
                HttpMethod::Post => IndexMap::new(),
            },
            body: match provider.method {
                HttpMethod::Get => None,
                HttpMethod::Post => Some(provider.body.clone().unwrap_or_else(|| {
                    Value::Object(serde_json::Map::new())
                })),
            },
        }
    }
}

/// Outcome of a connectivity test against a provider.
///
/// Unlike [`ProviderClient::call`], a probe reports non-2xx statuses instead
/// of failing on them.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub success: bool,
    pub status: u16,
    pub status_text: String,
    pub duration_ms: u64,
    pub request: ProbeRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeReport {
    fn failed(request: ProbeRequest, status: u16, message: String, elapsed: Duration) -> Self {
        Self {
            success: false,
            status,
            status_text: message.clone(),
            duration_ms: elapsed.as_millis() as u64,
            request,
            data_preview: None,
            error: Some(message),
        }
    }
}

#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Issue the provider request and return its JSON body.
    async fn call(&self, provider: &ProviderDefinition) -> Result<Value, ProviderError>;

    /// Issue the provider request and describe the outcome.
    async fn probe(&self, provider: &ProviderDefinition) -> ProbeReport {
        let request = ProbeRequest::from(provider);
        let started = Instant::now();
        match self.call(provider).await {
            Ok(body) => ProbeReport {
                success: true,
                status: 200,
                status_text: "OK".to_string(),
                duration_ms: started.elapsed().as_millis() as u64,
                request,
                data_preview: Some(preview(&pretty_json(&body))),
                error: None,
            },
            Err(ProviderError::Status { status, reason }) => ProbeReport {
                success: false,
                status,
                status_text: reason,
                duration_ms: started.elapsed().as_millis() as u64,
                request,
                data_preview: None,
                error: None,
            },
            Err(err) => ProbeReport::failed(request, 0, err.to_string(), started.elapsed()),
        }
    }
}

/// `reqwest`-backed provider client.
#[derive(Clone)]
pub struct HttpProviderClient {
    client: reqwest::Client,
}

impl HttpProviderClient {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    fn build_request(
        &self,
        provider: &ProviderDefinition,
    ) -> Result<reqwest::RequestBuilder, ProviderError> {
        let url = reqwest::Url::parse(&provider.url).map_err(|e| ProviderError::InvalidUrl {
            url: provider.url.clone(),
            reason: e.to_string(),
        })?;

        let method = match provider.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut request = self
            .client
            .request(method, url)
            .headers(request_headers(provider)?);

        match provider.method {
            HttpMethod::Get if !provider.params.is_empty() => {
                request = request.query(&query_pairs(&provider.params));
            }
            HttpMethod::Post => {
                if let Some(body) = &provider.body {
                    request = request.json(body);
                }
            }
            HttpMethod::Get => {}
        }

        Ok(request)
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    async fn call(&self, provider: &ProviderDefinition) -> Result<Value, ProviderError> {
        let request = self.build_request(provider)?;
        debug!(
            "Calling provider '{}': {} {}",
            provider.id,
            provider.method.as_str(),
            provider.url
        );

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "Provider '{}' returned {}: {}",
                provider.id,
                status.as_u16(),
                truncate(&body, ERROR_BODY_SNIPPET)
            );
            return Err(ProviderError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::InvalidBody(e.to_string()))
    }

    async fn probe(&self, provider: &ProviderDefinition) -> ProbeReport {
        let request_echo = ProbeRequest::from(provider);
        let started = Instant::now();

        let request = match self.build_request(provider) {
            Ok(request) => request,
            Err(err) => {
                return ProbeReport::failed(request_echo, 0, err.to_string(), started.elapsed())
            }
        };

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                let duration_ms = started.elapsed().as_millis() as u64;
                debug!(
                    "Probe of provider '{}' returned {} in {duration_ms} ms",
                    provider.id,
                    status.as_u16()
                );
                let rendered = match serde_json::from_str::<Value>(&text) {
                    Ok(body) => pretty_json(&body),
                    Err(_) => text,
                };
                ProbeReport {
                    success: status.is_success(),
                    status: status.as_u16(),
                    status_text: status.canonical_reason().unwrap_or_default().to_string(),
                    duration_ms,
                    request: request_echo,
                    data_preview: Some(preview(&rendered)),
                    error: None,
                }
            }
            Err(err) => ProbeReport::failed(
                request_echo,
                0,
                ProviderError::from(err).to_string(),
                started.elapsed(),
            ),
        }
    }
}

/// Default headers, overridden by the provider's own.
fn request_headers(provider: &ProviderDefinition) -> Result<HeaderMap, ProviderError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("apiforge/", env!("CARGO_PKG_VERSION"))),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

    for (name, value) in &provider.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ProviderError::InvalidHeader { name: name.clone() }
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            ProviderError::InvalidHeader { name: name.clone() }
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// Render params as query pairs. Strings are sent verbatim, anything else as
/// its JSON text.
pub fn query_pairs(params: &IndexMap<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(name, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name.clone(), rendered)
        })
        .collect()
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn preview(text: &str) -> String {
    truncate(text, PROBE_PREVIEW_LIMIT)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
