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

//! Hit accounting for resolved endpoints and the analytics derived from it.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use indexmap::IndexMap;
use log::warn;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use utoipa::ToSchema;

use crate::models::{EndpointDefinition, HttpMethod};

/// One request against an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HitRecord {
    pub timestamp: DateTime<Utc>,
    pub ip: String,
    pub user_agent: String,
}

impl HitRecord {
    pub fn now(ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            ip: ip.into(),
            user_agent: user_agent.into(),
        }
    }
}

/// A hit attributed to an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct HitEntry {
    pub endpoint_id: String,
    pub record: HitRecord,
}

#[derive(Debug, thiserror::Error)]
pub enum HitError {
    #[error("Endpoint '{0}' not found")]
    UnknownEndpoint(String),
}

#[async_trait]
pub trait HitRecorder: Send + Sync {
    async fn record(&self, endpoint_id: &str, hit: HitRecord) -> Result<(), HitError>;
}

/// Record a hit in the background. Failures are logged and never reach the
/// caller.
pub fn spawn_record(
    recorder: Arc<dyn HitRecorder>,
    endpoint_id: String,
    hit: HitRecord,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = recorder.record(&endpoint_id, hit).await {
            warn!("Failed to record hit for endpoint '{endpoint_id}': {e}");
        }
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiHitCount {
    pub id: String,
    pub label: String,
    pub property: String,
    pub route: String,
    pub method: HttpMethod,
    pub hits: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyHits {
    /// UTC day, `YYYY-MM-DD`.
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub total_apis: usize,
    pub total_hits: u64,
    /// Hits in the trailing 24 hours.
    pub recent_hits: u64,
    pub hits_by_api: Vec<ApiHitCount>,
    pub hits_over_time: Vec<DailyHits>,
}

const TRAILING_DAYS: i64 = 7;

/// Summarize hit counters and the hit log as of `now`.
pub fn summarize(
    endpoints: &[EndpointDefinition],
    log: &[HitEntry],
    now: DateTime<Utc>,
) -> AnalyticsReport {
    let total_hits = endpoints.iter().map(|e| e.hit_count).sum();

    let day_ago = now - Duration::hours(24);
    let recent_hits = log
        .iter()
        .filter(|entry| entry.record.timestamp > day_ago && entry.record.timestamp <= now)
        .count() as u64;

    let mut hits_by_api: Vec<ApiHitCount> = endpoints
        .iter()
        .map(|e| ApiHitCount {
            id: e.id.clone(),
            label: e.label.clone(),
            property: e.property.clone(),
            route: e.route.clone(),
            method: e.method,
            hits: e.hit_count,
        })
        .collect();
    // stable, so ties keep catalog order
    hits_by_api.sort_by(|a, b| b.hits.cmp(&a.hits));

    let today = now.date_naive();
    let first_day = today - Duration::days(TRAILING_DAYS - 1);
    let mut per_day: IndexMap<NaiveDate, u64> = (0..TRAILING_DAYS)
        .map(|offset| (first_day + Duration::days(offset), 0))
        .collect();
    for entry in log {
        if let Some(count) = per_day.get_mut(&entry.record.timestamp.date_naive()) {
            *count += 1;
        }
    }
    let hits_over_time = per_day
        .into_iter()
        .map(|(day, count)| DailyHits {
            date: day.format("%Y-%m-%d").to_string(),
            count,
        })
        .collect();

    AnalyticsReport {
        total_apis: endpoints.len(),
        total_hits,
        recent_hits,
        hits_by_api,
        hits_over_time,
    }
}
