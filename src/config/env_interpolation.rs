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

//! `${VAR}` / `${VAR:-default}` substitution over raw configuration text.
//!
//! A variable that is unset or empty takes its default; without a default it
//! is an error. Every missing variable is reported at once. `$${VAR}` is an
//! escape and yields the literal text `${VAR}`.

use lazy_static::lazy_static;
use log::debug;
use regex::{Captures, Regex};
use std::env;

const MAX_INTERPOLATED_LENGTH: usize = 10 * 1024 * 1024;

lazy_static! {
    static ref ENV_REFERENCE: Regex =
        Regex::new(r"\$(\$?)\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env reference pattern is valid");
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InterpolationError {
    #[error("Environment variable(s) not set and without default: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error("Environment variable '{0}' is not valid Unicode")]
    NotUnicode(String),

    #[error("Interpolated configuration exceeds {MAX_INTERPOLATED_LENGTH} bytes")]
    ResultTooLarge,
}

enum Lookup {
    Value(String),
    Missing,
    NotUnicode,
}

fn lookup(name: &str, default: Option<&str>) -> Lookup {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Lookup::Value(value),
        Ok(_) | Err(env::VarError::NotPresent) => match default {
            Some(default) => Lookup::Value(default.to_string()),
            None => Lookup::Missing,
        },
        Err(env::VarError::NotUnicode(_)) => Lookup::NotUnicode,
    }
}

/// Substitute environment references in `input`.
pub fn interpolate(input: &str) -> Result<String, InterpolationError> {
    let mut missing: Vec<String> = Vec::new();
    let mut not_unicode: Option<String> = None;
    let mut substituted: Vec<String> = Vec::new();

    let output = ENV_REFERENCE.replace_all(input, |caps: &Captures<'_>| {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let name = caps.get(2).map_or("", |m| m.as_str());

        if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
            return whole[1..].to_string();
        }

        match lookup(name, caps.get(3).map(|m| m.as_str())) {
            Lookup::Value(value) => {
                substituted.push(name.to_string());
                value
            }
            Lookup::Missing => {
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
                String::new()
            }
            Lookup::NotUnicode => {
                not_unicode.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    if let Some(name) = not_unicode {
        return Err(InterpolationError::NotUnicode(name));
    }
    if !missing.is_empty() {
        return Err(InterpolationError::MissingVariables(missing));
    }
    if output.len() > MAX_INTERPOLATED_LENGTH {
        return Err(InterpolationError::ResultTooLarge);
    }

    if !substituted.is_empty() {
        substituted.sort_unstable();
        substituted.dedup();
        debug!("Interpolated environment variables: {}", substituted.join(", "));
    }

    Ok(output.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_substitutes_set_variables() {
        env::set_var("APIFORGE_TEST_HOST", "api.internal");
        env::set_var("APIFORGE_TEST_PORT", "9090");

        let result = interpolate("host: ${APIFORGE_TEST_HOST}\nport: ${APIFORGE_TEST_PORT}").unwrap();
        assert_eq!(result, "host: api.internal\nport: 9090");

        env::remove_var("APIFORGE_TEST_HOST");
        env::remove_var("APIFORGE_TEST_PORT");
    }

    #[test]
    #[serial]
    fn test_default_applies_when_unset_or_empty() {
        env::remove_var("APIFORGE_TEST_UNSET");
        env::set_var("APIFORGE_TEST_EMPTY", "");

        let result =
            interpolate("a: ${APIFORGE_TEST_UNSET:-one}\nb: ${APIFORGE_TEST_EMPTY:-two}\nc: ${APIFORGE_TEST_UNSET:-}")
                .unwrap();
        assert_eq!(result, "a: one\nb: two\nc: ");

        env::remove_var("APIFORGE_TEST_EMPTY");
    }

    #[test]
    #[serial]
    fn test_reports_every_missing_variable() {
        env::remove_var("APIFORGE_TEST_MISSING_A");
        env::remove_var("APIFORGE_TEST_MISSING_B");

        let err = interpolate(
            "${APIFORGE_TEST_MISSING_A} ${APIFORGE_TEST_MISSING_B} ${APIFORGE_TEST_MISSING_A}",
        )
        .unwrap_err();
        assert_eq!(
            err,
            InterpolationError::MissingVariables(vec![
                "APIFORGE_TEST_MISSING_A".to_string(),
                "APIFORGE_TEST_MISSING_B".to_string(),
            ])
        );
    }

    #[test]
    #[serial]
    fn test_escaped_reference_is_literal() {
        env::set_var("APIFORGE_TEST_ESCAPED", "nope");
        let result = interpolate("template: $${APIFORGE_TEST_ESCAPED}").unwrap();
        assert_eq!(result, "template: ${APIFORGE_TEST_ESCAPED}");
        env::remove_var("APIFORGE_TEST_ESCAPED");
    }

    #[test]
    fn test_text_without_references_is_untouched() {
        let input = "title: \"{{title}}\"\nprice: $5 {not a var}";
        assert_eq!(interpolate(input).unwrap(), input);
    }

    #[test]
    fn test_invalid_names_are_ignored() {
        assert_eq!(interpolate("${1ABC} ${}").unwrap(), "${1ABC} ${}");
    }
}
