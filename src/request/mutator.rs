//! Write path: rewrite one request value through a scoped pointer
//!
//! Failures never escape as errors. A malformed address, an unsupported scope or
//! an opaque payload yields [`Resolution::Invalid`]; a well-formed address that
//! finds nothing (or an updater that declines) yields [`Resolution::NotFound`].

use super::builder::{FormField, RequestBody, RequestBuilder};
use crate::pointer::{split_first_token, Resolution, Scope, ScopedPointer};
use crate::types::{JsonValue, ParamMap};
use tracing::debug;

impl RequestBuilder {
    /// Rewrite the value addressed by `address`, returning the updated request.
    ///
    /// The updater receives the current value and returns its replacement, or
    /// `None` to leave the request untouched. The replacement keeps the shape of
    /// the value it replaces where possible (numeric text written over a number
    /// stays a number, and so on).
    pub fn update_by_reference<F>(&self, address: &str, updater: F) -> Resolution<Self>
    where
        F: FnOnce(&JsonValue) -> Option<JsonValue>,
    {
        let pointer = match ScopedPointer::parse(address) {
            Ok(pointer) => pointer,
            Err(e) => {
                debug!("Ignoring request address: {e}");
                return Resolution::Invalid;
            }
        };

        let mut updated = self.clone();
        let node = match updated.node_mut(&pointer) {
            Resolution::Resolved(node) => node,
            Resolution::NotFound => return Resolution::NotFound,
            Resolution::Invalid => return Resolution::Invalid,
        };

        let Some(replacement) = updater(node) else {
            return Resolution::NotFound;
        };
        let value = rematerialize(node, replacement);
        *node = value;

        Resolution::Resolved(updated)
    }

    /// Same as [`update_by_reference`](Self::update_by_reference), but returns an
    /// unmodified clone when nothing could be changed
    #[must_use]
    pub fn update_by_reference_or_keep<F>(&self, address: &str, updater: F) -> Self
    where
        F: FnOnce(&JsonValue) -> Option<JsonValue>,
    {
        self.update_by_reference(address, updater)
            .ok()
            .unwrap_or_else(|| self.clone())
    }

    /// Read the value addressed by `address` without changing anything
    pub fn value_by_reference(&self, address: &str) -> Resolution<JsonValue> {
        let mut current = None;
        let outcome = self.update_by_reference(address, |value| {
            current = Some(value.clone());
            None
        });

        match outcome {
            Resolution::Invalid => Resolution::Invalid,
            _ => current.into(),
        }
    }

    fn node_mut(&mut self, pointer: &ScopedPointer) -> Resolution<&mut JsonValue> {
        match pointer.scope() {
            Scope::RequestQuery => param_node(&mut self.query_params, pointer.path(), false),
            Scope::RequestHeader => param_node(&mut self.headers, pointer.path(), true),
            Scope::RequestPath => param_node(&mut self.template_params, pointer.path(), false),
            Scope::RequestBody => body_node(&mut self.body, pointer.path()),
            scope @ (Scope::ResponseBody | Scope::ResponseHeaders) => {
                debug!("Scope {scope} cannot be written on a request");
                Resolution::Invalid
            }
        }
    }
}

fn param_node<'a>(
    params: &'a mut ParamMap,
    path: &str,
    ignore_case: bool,
) -> Resolution<&'a mut JsonValue> {
    let (name, rest) = split_first_token(path);
    let key = if ignore_case {
        params
            .keys()
            .find(|key| key.eq_ignore_ascii_case(&name))
            .cloned()
            .unwrap_or(name)
    } else {
        name
    };

    match params.get_mut(&key) {
        Some(value) => descend(value, rest),
        None => Resolution::NotFound,
    }
}

fn body_node<'a>(body: &'a mut RequestBody, path: &str) -> Resolution<&'a mut JsonValue> {
    match body {
        RequestBody::Empty => Resolution::NotFound,
        RequestBody::Json(value) => value.pointer_mut(path).into(),
        RequestBody::Form(fields) => {
            let (name, rest) = split_first_token(path);
            match fields.get_mut(&name) {
                Some(FormField::Value(value)) => descend(value, rest),
                Some(FormField::File(_)) => {
                    debug!("Form file '{name}' is not addressable");
                    Resolution::Invalid
                }
                None => Resolution::NotFound,
            }
        }
        RequestBody::Binary(_) => {
            debug!("Binary request bodies are not addressable");
            Resolution::Invalid
        }
    }
}

fn descend<'a>(value: &'a mut JsonValue, rest: &str) -> Resolution<&'a mut JsonValue> {
    if rest.is_empty() {
        Resolution::Resolved(value)
    } else {
        value.pointer_mut(rest).into()
    }
}

/// Give a replacement value the shape of the value it replaces
pub(crate) fn rematerialize(original: &JsonValue, replacement: JsonValue) -> JsonValue {
    match (original, replacement) {
        (JsonValue::Number(_), JsonValue::String(text)) => {
            parse_number(&text).unwrap_or(JsonValue::String(text))
        }
        (JsonValue::String(_), JsonValue::Number(n)) => JsonValue::String(n.to_string()),
        (JsonValue::String(_), JsonValue::Bool(b)) => JsonValue::String(b.to_string()),
        (JsonValue::Bool(_), JsonValue::String(text)) => {
            if text == "true" {
                JsonValue::Bool(true)
            } else if text == "false" {
                JsonValue::Bool(false)
            } else {
                JsonValue::String(text)
            }
        }
        (_, replacement) => replacement,
    }
}

fn parse_number(text: &str) -> Option<JsonValue> {
    let text = text.trim();
    if let Ok(int) = text.parse::<i64>() {
        return Some(JsonValue::from(int));
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(JsonValue::Number)
}
