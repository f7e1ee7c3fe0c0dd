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

//! `{{path}}` templates over JSON values.
//!
//! A template is any JSON value. Strings of the form `{{path}}` are
//! placeholders resolved against a source item with [`KeyPath`]; arrays and
//! objects are walked recursively; everything else passes through unchanged.
//!
//! Two flavors exist because their call sites disagree on semantics:
//!
//! * [`TemplateFlavor::WholeValue`] (API data templates) only recognises a
//!   placeholder that is the entire string. A missing field renders as `null`.
//! * [`TemplateFlavor::Embedded`] (feed data maps) additionally substitutes
//!   placeholders inside larger strings, e.g. `"thumb_{{id}}.jpg"`. A missing
//!   embedded field renders as the empty string, while a whole-value
//!   placeholder still renders as `null`.
//!
//! Templates are compiled once into a [`Template`] tree and rendered per item.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use super::key_path::KeyPath;

lazy_static! {
    /// Matches one `{{path}}` occurrence inside a string.
    static ref EMBEDDED_PLACEHOLDER: Regex =
        Regex::new(r"\{\{(.+?)\}\}").expect("Invalid placeholder pattern");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFlavor {
    WholeValue,
    Embedded,
}

/// A compiled template node.
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// The whole value is `{{path}}`.
    Placeholder(KeyPath),
    /// A string with one or more embedded placeholders.
    Interpolated(Vec<Segment>),
    Literal(Value),
    List(Vec<Template>),
    Map(Vec<(String, Template)>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Field(KeyPath),
}

impl Template {
    pub fn compile(value: &Value, flavor: TemplateFlavor) -> Self {
        match value {
            Value::String(s) => compile_string(s, flavor),
            Value::Array(items) => Template::List(
                items
                    .iter()
                    .map(|item| Template::compile(item, flavor))
                    .collect(),
            ),
            Value::Object(map) => Template::compile_map(map, flavor),
            other => Template::Literal(other.clone()),
        }
    }

    pub fn compile_map(map: &Map<String, Value>, flavor: TemplateFlavor) -> Self {
        Template::Map(
            map.iter()
                .map(|(key, value)| (key.clone(), Template::compile(value, flavor)))
                .collect(),
        )
    }

    /// Render this template against one source item. Never fails; missing
    /// fields become `null` or `""` depending on the node.
    pub fn render(&self, item: &Value) -> Value {
        match self {
            Template::Placeholder(path) => path.resolve_owned(item),
            Template::Interpolated(segments) => {
                let mut out = String::new();
                for segment in segments {
                    match segment {
                        Segment::Text(text) => out.push_str(text),
                        Segment::Field(path) => {
                            if let Some(value) = path.resolve(item) {
                                push_display(&mut out, value);
                            }
                        }
                    }
                }
                Value::String(out)
            }
            Template::Literal(value) => value.clone(),
            Template::List(items) => Value::Array(items.iter().map(|t| t.render(item)).collect()),
            Template::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, template)| (key.clone(), template.render(item)))
                    .collect(),
            ),
        }
    }
}

fn compile_string(s: &str, flavor: TemplateFlavor) -> Template {
    if let Some(path) = whole_value_path(s) {
        // An empty path would select the whole item; data maps keep it as text.
        if path.is_empty() && flavor == TemplateFlavor::Embedded {
            return Template::Literal(Value::String(s.to_string()));
        }
        return Template::Placeholder(KeyPath::parse(path));
    }

    if flavor == TemplateFlavor::WholeValue {
        return Template::Literal(Value::String(s.to_string()));
    }

    let mut segments = Vec::new();
    let mut last_end = 0;
    for caps in EMBEDDED_PLACEHOLDER.captures_iter(s) {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let path = path.as_str().trim();
        if path.is_empty() {
            continue;
        }
        if whole.start() > last_end {
            segments.push(Segment::Text(s[last_end..whole.start()].to_string()));
        }
        segments.push(Segment::Field(KeyPath::parse(path)));
        last_end = whole.end();
    }

    if segments.is_empty() {
        return Template::Literal(Value::String(s.to_string()));
    }
    if last_end < s.len() {
        segments.push(Segment::Text(s[last_end..].to_string()));
    }
    Template::Interpolated(segments)
}

/// The inner path when `s` is exactly one `{{path}}` placeholder.
fn whole_value_path(s: &str) -> Option<&str> {
    let inner = s.strip_prefix("{{")?.strip_suffix("}}")?;
    if inner.contains("}}") {
        return None;
    }
    Some(inner.trim())
}

fn push_display(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Number(n) => match n.as_f64().filter(|_| n.is_f64()) {
            Some(f) => out.push_str(&format_float(f)),
            None => out.push_str(&n.to_string()),
        },
        other => out.push_str(&other.to_string()),
    }
}

/// Whole floats print without a fractional part (`7.0` as `7`).
fn format_float(f: f64) -> String {
    if f == 0.0 {
        "0".to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e21 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

/// Map every item through an object template (whole-value flavor).
pub fn apply_template(items: &[Value], template: &Map<String, Value>) -> Vec<Value> {
    let compiled = Template::compile_map(template, TemplateFlavor::WholeValue);
    items.iter().map(|item| compiled.render(item)).collect()
}

/// Render a single template value against an item (whole-value flavor).
pub fn apply_template_value(template_value: &Value, item: &Value) -> Value {
    Template::compile(template_value, TemplateFlavor::WholeValue).render(item)
}

/// Render a single template value against an item (embedded flavor).
pub fn apply_data_map_value(template_value: &Value, item: &Value) -> Value {
    Template::compile(template_value, TemplateFlavor::Embedded).render(item)
}

/// Render a feed data-map template against an item (embedded flavor).
pub fn apply_data_map_template(template: &Map<String, Value>, item: &Value) -> Value {
    Template::compile_map(template, TemplateFlavor::Embedded).render(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_whole_value_placeholder_keeps_type() {
        assert_eq!(apply_template_value(&json!("{{x}}"), &json!({"x": 7})), json!(7));
        assert_eq!(
            apply_template_value(&json!("{{meta.tags}}"), &json!({"meta": {"tags": ["a", "b"]}})),
            json!(["a", "b"])
        );
    }

    #[test]
    fn test_whole_value_missing_field_is_null() {
        assert_eq!(apply_template_value(&json!("{{missing}}"), &json!({})), Value::Null);
        assert_eq!(apply_data_map_value(&json!("{{missing}}"), &json!({})), Value::Null);
    }

    #[test]
    fn test_placeholder_path_is_trimmed() {
        assert_eq!(apply_template_value(&json!("{{ x }}"), &json!({"x": 1})), json!(1));
    }

    #[test]
    fn test_embedded_placeholders() {
        assert_eq!(
            apply_data_map_value(&json!("pre_{{x}}_post"), &json!({"x": 7})),
            json!("pre_7_post")
        );
        assert_eq!(
            apply_data_map_value(&json!("pre_{{missing}}_post"), &json!({})),
            json!("pre__post")
        );
        assert_eq!(
            apply_data_map_value(&json!("{{a}}-{{b.c}}"), &json!({"a": "x", "b": {"c": true}})),
            json!("x-true")
        );
    }

    #[test]
    fn test_embedded_null_renders_empty() {
        assert_eq!(
            apply_data_map_value(&json!("id:{{id}}"), &json!({"id": null})),
            json!("id:")
        );
    }

    #[test]
    fn test_whole_value_flavor_ignores_embedded_placeholders() {
        assert_eq!(
            apply_template_value(&json!("pre_{{x}}_post"), &json!({"x": 7})),
            json!("pre_{{x}}_post")
        );
        assert_eq!(
            apply_template_value(&json!("{{a}}-{{b}}"), &json!({"a": 1, "b": 2})),
            json!("{{a}}-{{b}}")
        );
    }

    #[test]
    fn test_unclosed_placeholder_is_literal() {
        assert_eq!(
            apply_data_map_value(&json!("{{open"), &json!({"open": 1})),
            json!("{{open")
        );
        assert_eq!(
            apply_template_value(&json!("{{open"), &json!({"open": 1})),
            json!("{{open")
        );
    }

    #[test]
    fn test_literals_pass_through() {
        let item = json!({"x": 1});
        for literal in [json!(3), json!(true), Value::Null, json!("plain")] {
            assert_eq!(apply_template_value(&literal, &item), literal);
            assert_eq!(apply_data_map_value(&literal, &item), literal);
        }
    }

    #[test]
    fn test_nested_objects_and_arrays() {
        let template = json!({
            "title": "{{name}}",
            "media": {"url": "{{assets.video}}", "kind": "mp4"},
            "pair": ["{{a}}", 2]
        });
        let item = json!({"name": "n", "assets": {"video": "v.mp4"}, "a": "first"});

        assert_eq!(
            apply_template_value(&template, &item),
            json!({
                "title": "n",
                "media": {"url": "v.mp4", "kind": "mp4"},
                "pair": ["first", 2]
            })
        );
    }

    #[test]
    fn test_apply_template_maps_each_item() {
        let template = json!({"id": "{{uid}}", "label": "{{info.name}}", "source": "cms"});
        let Value::Object(template) = template else {
            unreachable!()
        };
        let items = vec![
            json!({"uid": 1, "info": {"name": "one"}}),
            json!({"uid": 2}),
        ];

        assert_eq!(
            apply_template(&items, &template),
            vec![
                json!({"id": 1, "label": "one", "source": "cms"}),
                json!({"id": 2, "label": null, "source": "cms"}),
            ]
        );
    }

    #[test]
    fn test_data_map_template_mixes_both_forms() {
        let template = json!({
            "title": "{{title}}",
            "thumb": "https://cdn.example.com/{{id}}/{{size}}.jpg",
            "live": false,
            "rank": 3,
            "nothing": null,
            "nested": {"slug": "v-{{id}}"}
        });
        let Value::Object(template) = template else {
            unreachable!()
        };

        assert_eq!(
            apply_data_map_template(&template, &json!({"id": 42, "title": "Clip"})),
            json!({
                "title": "Clip",
                "thumb": "https://cdn.example.com/42/.jpg",
                "live": false,
                "rank": 3,
                "nothing": null,
                "nested": {"slug": "v-42"}
            })
        );
    }

    #[test]
    fn test_compile_classifies_nodes() {
        assert_eq!(
            Template::compile(&json!("{{a.b}}"), TemplateFlavor::Embedded),
            Template::Placeholder(KeyPath::parse("a.b"))
        );
        assert_eq!(
            Template::compile(&json!("x{{a}}"), TemplateFlavor::Embedded),
            Template::Interpolated(vec![
                Segment::Text("x".to_string()),
                Segment::Field(KeyPath::parse("a")),
            ])
        );
        assert_eq!(
            Template::compile(&json!({"k": [1, "s"]}), TemplateFlavor::Embedded),
            Template::Map(vec![(
                "k".to_string(),
                Template::List(vec![
                    Template::Literal(json!(1)),
                    Template::Literal(json!("s")),
                ]),
            )])
        );
    }

    #[test]
    fn test_empty_placeholder_in_data_map_is_literal() {
        let item = json!({"secret": 1});
        assert_eq!(apply_data_map_value(&json!("{{}}"), &item), json!("{{}}"));
        assert_eq!(apply_data_map_value(&json!("{{ }}"), &item), json!("{{ }}"));
        assert_eq!(
            apply_data_map_value(&json!("a{{ }}b{{secret}}"), &item),
            json!("a{{ }}b1")
        );
        assert_eq!(
            apply_data_map_template(&Map::from_iter([("v".to_string(), json!("{{}}"))]), &item),
            json!({"v": "{{}}"})
        );
    }

    #[test]
    fn test_empty_placeholder_in_api_template_selects_item() {
        let item = json!({"secret": 1});
        assert_eq!(apply_template_value(&json!("{{}}"), &item), item);
    }

    #[test]
    fn test_whole_floats_render_as_integers() {
        let item = json!({"whole": 7.0, "frac": 2.5, "int": 3, "neg": -4.0, "zero": -0.0});
        assert_eq!(
            apply_data_map_value(&json!("n={{whole}} f={{frac}} i={{int}} m={{neg}} z={{zero}}"), &item),
            json!("n=7 f=2.5 i=3 m=-4 z=0")
        );
        assert_eq!(apply_data_map_value(&json!("{{whole}}"), &item), json!(7.0));
    }

    #[test]
    fn test_rendering_does_not_mutate_input() {
        let template = json!({"v": "{{a}}"});
        let item = json!({"a": {"deep": 1}});
        let before = item.clone();
        let _ = apply_template_value(&template, &item);
        assert_eq!(item, before);
    }
}
