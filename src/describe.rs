//! Turns the backend's arbitrary nested JSON descriptions into flat
//! label/value display text.

use serde_json::{Map, Value};

/// Shape of a JSON value as the renderer sees it. Classification is total:
/// every value falls into exactly one shape.
#[derive(Debug)]
pub enum Shape<'a> {
    /// Null, boolean or anything else with no display form.
    Empty,
    /// String or number.
    Primitive(&'a Value),
    /// Array whose first element carries both `Name` and `Values`.
    OptionList(&'a [Value]),
    /// Any other array.
    Sequence(&'a [Value]),
    Mapping(&'a Map<String, Value>),
}

/// The option-list check must run before the plain-sequence fallback:
/// both are arrays, and only the first element's fields tell them apart.
pub fn classify(value: &Value) -> Shape<'_> {
    match value {
        Value::String(_) | Value::Number(_) => Shape::Primitive(value),
        Value::Array(items) if is_option_list(items) => Shape::OptionList(items),
        Value::Array(items) => Shape::Sequence(items),
        Value::Object(map) => Shape::Mapping(map),
        Value::Null | Value::Bool(_) => Shape::Empty,
    }
}

fn is_option_list(items: &[Value]) -> bool {
    match items.first() {
        Some(Value::Object(first)) => first.contains_key("Name") && first.contains_key("Values"),
        _ => false,
    }
}

/// "material_type" -> "Material Type". Words keep their remaining casing.
pub fn display_label(key: &str) -> String {
    key.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render any JSON value to its display string. Pure; identical input
/// always yields identical output.
pub fn render_value(value: &Value) -> String {
    match classify(value) {
        Shape::Empty => String::new(),
        Shape::Primitive(Value::String(s)) => s.clone(),
        Shape::Primitive(v) => v.to_string(),
        Shape::OptionList(items) => render_option_list(items),
        Shape::Sequence(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(", "),
        Shape::Mapping(map) => render_mapping(map),
    }
}

fn render_option_list(items: &[Value]) -> String {
    items
        .iter()
        .map(|record| match record {
            Value::Object(fields) => {
                let name = fields.get("Name").map(render_value).unwrap_or_default();
                let values = fields.get("Values").map(render_value).unwrap_or_default();
                format!("{}: {}", name, values)
            }
            other => render_value(other),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn render_mapping(map: &Map<String, Value>) -> String {
    map.iter()
        .map(|(key, value)| format!("{}: {}", display_label(key), render_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Descriptions sometimes arrive wrapped one layer deep under a
/// `"Structured Data"` or `"structured_data"` key; render the inner value
/// in that case.
pub fn unwrap_structured(description: &Value) -> &Value {
    if let Value::Object(map) = description {
        for key in ["Structured Data", "structured_data"] {
            if let Some(inner) = map.get(key) {
                if !inner.is_null() {
                    return inner;
                }
            }
        }
    }
    description
}

/// Top-level entry point: unwrap the optional wrapper, then render.
pub fn render_description(description: &Value) -> String {
    render_value(unwrap_structured(description))
}
