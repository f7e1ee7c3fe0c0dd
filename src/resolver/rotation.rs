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

//! Payload rotation: repeating a resolved payload to simulate larger datasets.

use serde_json::Value;

/// Repeat `payload` `times` times.
///
/// * `times <= 1` or a `null` payload: returned unchanged.
/// * Array: the items of `times` copies are concatenated in order.
/// * Object: an array of `times` copies of the object.
/// * Other scalars: returned unchanged.
pub fn rotate(payload: Value, times: u32) -> Value {
    if times <= 1 {
        return payload;
    }

    match payload {
        Value::Array(items) => {
            let mut rotated = Vec::with_capacity(items.len() * times as usize);
            for _ in 0..times {
                rotated.extend(items.iter().cloned());
            }
            Value::Array(rotated)
        }
        Value::Object(map) => {
            let object = Value::Object(map);
            Value::Array(vec![object; times as usize])
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rotate_array_concatenates_runs() {
        assert_eq!(rotate(json!([1, 2]), 3), json!([1, 2, 1, 2, 1, 2]));
    }

    #[test]
    fn test_rotate_object_wraps_copies() {
        assert_eq!(rotate(json!({"a": 1}), 2), json!([{"a": 1}, {"a": 1}]));
    }

    #[test]
    fn test_rotate_zero_and_one_are_identity() {
        let payload = json!({"a": [1, 2]});
        assert_eq!(rotate(payload.clone(), 0), payload);
        assert_eq!(rotate(payload.clone(), 1), payload);
    }

    #[test]
    fn test_rotate_scalars_and_null_pass_through() {
        assert_eq!(rotate(Value::Null, 4), Value::Null);
        assert_eq!(rotate(json!("text"), 4), json!("text"));
        assert_eq!(rotate(json!(9), 4), json!(9));
    }

    #[test]
    fn test_rotate_empty_array_stays_empty() {
        assert_eq!(rotate(json!([]), 5), json!([]));
    }

    #[test]
    fn test_rotated_copies_are_independent() {
        let mut rotated = rotate(json!([{"n": 1}]), 2);
        rotated[0]["n"] = json!(99);
        assert_eq!(rotated, json!([{"n": 99}, {"n": 1}]));
    }
}
