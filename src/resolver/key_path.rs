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

//! Dot-separated key path lookup over JSON values.
//!
//! A path such as `data.items` is split on `.` and walked one object key at a
//! time. Walking stops with no result as soon as the current value is falsy
//! (`null`, `false`, `0`, `""`) or is not an object. Array index segments and
//! escaped dots are not supported.

use serde_json::Value;

/// A parsed key path.
///
/// An empty path resolves to the input value itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::default();
        }
        Self {
            segments: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve this path against `value`.
    ///
    /// Returns `None` once a step lands on a falsy value, a non-object or a
    /// missing key.
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        let mut current = Some(value);
        for segment in &self.segments {
            current = match current {
                Some(acc) if is_truthy(acc) => acc.as_object().and_then(|map| map.get(segment)),
                _ => None,
            };
        }
        current
    }

    /// Resolve and clone, mapping a missing result to `Value::Null`.
    pub fn resolve_owned(&self, value: &Value) -> Value {
        self.resolve(value).cloned().unwrap_or(Value::Null)
    }
}

/// Resolve `path` against `value` in one step.
pub fn extract<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    KeyPath::parse(path).resolve(value)
}

/// `null`, `false`, zero, `NaN` and `""` are falsy; everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
