//! Path template rendering
//!
//! Handles `{name}` placeholders in request paths such as `/users/{user_id}/items`.
//! Values are percent-encoded; arrays render as `/`-joined segments.

use crate::error::{Error, Result};
use crate::types::{JsonValue, ParamMap};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use url::form_urlencoded;

/// Regex for matching path placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Render a path template with the given parameters
pub fn render_path(template: &str, params: &ParamMap) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = PLACEHOLDER_REGEX.replace_all(template, |caps: &Captures<'_>| {
        let name = &caps[1];
        match params.get(name) {
            Some(value) if !value.is_null() => encode_value(value),
            _ => {
                missing.push(name.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Extract all placeholder names from a template
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

fn encode_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(encode_value)
            .collect::<Vec<_>>()
            .join("/"),
        JsonValue::String(s) => encode_segment(s),
        other => encode_segment(&other.to_string()),
    }
}

fn encode_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
