//! Typed answer values.
//!
//! Raw submission answers arrive as an open JSON map. This module decodes
//! each value into the closed [`AnswerValue`] union exactly once, so the
//! validators and renderers downstream match on variants instead of
//! re-probing `serde_json::Value` shapes.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// A select/radio choice, possibly carrying free text for the `other` option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
}

/// A phone answer in the `{e164, country}` wire shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Phone {
    pub e164: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// One uploaded file reference. `id` and `url` are required by validation
/// but kept optional here so a malformed entry can be reported instead of
/// rejected at decode time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The closed union of answer shapes the intake accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Choice(Choice),
    Choices(Vec<Choice>),
    Phone(Phone),
    Location { lat: f64, lng: f64 },
    File(FileRef),
    Files(Vec<FileRef>),
    /// Anything that matched no known shape. Carried through verbatim so
    /// templates can still reach it; validators report it as invalid where
    /// a specific shape is required.
    Other(Value),
}

impl AnswerValue {
    /// Decode one raw answer value. Shape probing mirrors the original
    /// renderer: `e164` wins over `value`, which wins over `lat`/`lng`,
    /// which wins over file metadata.
    pub fn from_json(raw: &Value) -> AnswerValue {
        match raw {
            Value::String(s) => AnswerValue::Text(s.clone()),
            Value::Number(n) => match n.as_f64() {
                Some(f) => AnswerValue::Number(f),
                None => AnswerValue::Other(raw.clone()),
            },
            Value::Bool(b) => AnswerValue::Bool(*b),
            Value::Object(map) => {
                if let Some(e164) = map.get("e164").and_then(Value::as_str) {
                    return AnswerValue::Phone(Phone {
                        e164: e164.to_string(),
                        country: map.get("country").and_then(Value::as_str).map(String::from),
                    });
                }
                if let Some(value) = map.get("value").and_then(Value::as_str) {
                    return AnswerValue::Choice(Choice {
                        value: value.to_string(),
                        other: map.get("other").and_then(Value::as_str).map(String::from),
                    });
                }
                if let (Some(lat), Some(lng)) = (
                    map.get("lat").and_then(Value::as_f64),
                    map.get("lng").and_then(Value::as_f64),
                ) {
                    return AnswerValue::Location { lat, lng };
                }
                if map.contains_key("id") || map.contains_key("url") || map.contains_key("name") {
                    return AnswerValue::File(file_ref(map));
                }
                AnswerValue::Other(raw.clone())
            }
            Value::Array(items) => {
                if items
                    .iter()
                    .all(|i| i.get("value").map(Value::is_string).unwrap_or(false))
                {
                    let choices = items
                        .iter()
                        .map(|i| Choice {
                            value: i["value"].as_str().unwrap_or_default().to_string(),
                            other: i.get("other").and_then(Value::as_str).map(String::from),
                        })
                        .collect();
                    return AnswerValue::Choices(choices);
                }
                if items.iter().all(|i| {
                    i.as_object().is_some_and(|m| {
                        m.contains_key("id") || m.contains_key("url") || m.contains_key("name")
                    })
                }) {
                    let files = items
                        .iter()
                        .filter_map(Value::as_object)
                        .map(file_ref)
                        .collect();
                    return AnswerValue::Files(files);
                }
                AnswerValue::Other(raw.clone())
            }
            Value::Null => AnswerValue::Other(Value::Null),
        }
    }

    /// Re-encode for template contexts, rewriting `{value: "other",
    /// other: "<text>"}` so the rendered `value` becomes the free text.
    /// An empty `other` text leaves the literal `"other"` in place.
    pub fn to_template_value(&self) -> Value {
        match self {
            AnswerValue::Text(s) => Value::String(s.clone()),
            AnswerValue::Number(n) => serde_json::json!(n),
            AnswerValue::Bool(b) => Value::Bool(*b),
            AnswerValue::Choice(c) => choice_template_value(c),
            AnswerValue::Choices(cs) => {
                Value::Array(cs.iter().map(choice_template_value).collect())
            }
            AnswerValue::Phone(p) => serde_json::to_value(p).unwrap_or(Value::Null),
            AnswerValue::Location { lat, lng } => serde_json::json!({"lat": lat, "lng": lng}),
            AnswerValue::File(f) => serde_json::to_value(f).unwrap_or(Value::Null),
            AnswerValue::Files(fs) => serde_json::to_value(fs).unwrap_or(Value::Null),
            AnswerValue::Other(v) => v.clone(),
        }
    }
}

fn file_ref(map: &serde_json::Map<String, Value>) -> FileRef {
    FileRef {
        id: map.get("id").cloned(),
        url: map.get("url").and_then(Value::as_str).map(String::from),
        name: map.get("name").and_then(Value::as_str).map(String::from),
    }
}

fn choice_template_value(c: &Choice) -> Value {
    let value = match (&c.value, &c.other) {
        (v, Some(text)) if v == "other" && !text.is_empty() => text.clone(),
        (v, _) => v.clone(),
    };
    match &c.other {
        Some(other) => serde_json::json!({"value": value, "other": other}),
        None => serde_json::json!({"value": value}),
    }
}

// ---------------------------------------------------------------------------
// AnswerMap
// ---------------------------------------------------------------------------

/// Decoded answers keyed by field name. JSON `null` values are treated as
/// absent, which makes a required checkbox submitted as `null` fail the
/// required check rather than a shape check.
#[derive(Debug, Clone, Default)]
pub struct AnswerMap(BTreeMap<String, AnswerValue>);

impl AnswerMap {
    /// Decode the raw `answers` object from an intake request. Anything
    /// that is not a JSON object decodes to an empty map.
    pub fn from_json(raw: &Value) -> AnswerMap {
        let mut map = BTreeMap::new();
        if let Value::Object(entries) = raw {
            for (name, value) in entries {
                if value.is_null() {
                    continue;
                }
                map.insert(name.clone(), AnswerValue::from_json(value));
            }
        }
        AnswerMap(map)
    }

    pub fn get(&self, field: &str) -> Option<&AnswerValue> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
