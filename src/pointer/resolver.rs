//! Read path: resolve response-side addresses
//!
//! Only `$response.body` and `$response.headers` may be read here. Request
//! scopes resolve to [`Resolution::Invalid`] so a misconfigured address can never
//! read back from the outgoing request.

use super::types::{split_first_token, Resolution, Scope, ScopedPointer};
use serde_json::Value;
use tracing::debug;

/// Resolve an address against a response, returning the value as text.
///
/// Strings come back unquoted; numbers, booleans, objects and arrays come back
/// as compact JSON. A null node counts as not found.
pub fn resolve_value(
    address: &str,
    response_body: Option<&str>,
    response_headers: Option<&str>,
) -> Resolution<String> {
    let pointer = match ScopedPointer::parse(address) {
        Ok(pointer) => pointer,
        Err(e) => {
            debug!("Ignoring response address: {e}");
            return Resolution::Invalid;
        }
    };

    let document = match pointer.scope() {
        Scope::ResponseBody => response_body,
        Scope::ResponseHeaders => response_headers,
        scope => {
            debug!("Scope {scope} cannot be read from a response");
            return Resolution::Invalid;
        }
    };

    let Some(document) = document else {
        return Resolution::NotFound;
    };

    let Ok(root) = serde_json::from_str::<Value>(document) else {
        debug!("Response {} is not valid JSON", pointer.scope());
        return Resolution::NotFound;
    };

    let node = if pointer.scope() == Scope::ResponseHeaders {
        header_node(&root, pointer.path())
    } else {
        root.pointer(pointer.path())
    };

    node.and_then(node_text).into()
}

/// Resolve an address against a response, folding every miss into `None`
pub fn resolve(
    address: &str,
    response_body: Option<&str>,
    response_headers: Option<&str>,
) -> Option<String> {
    resolve_value(address, response_body, response_headers).ok()
}

/// Header names are matched case-insensitively on the first pointer token
fn header_node<'a>(headers: &'a Value, path: &str) -> Option<&'a Value> {
    let (name, rest) = split_first_token(path);
    let value = headers
        .as_object()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        .map(|(_, value)| value)?;

    if rest.is_empty() {
        Some(value)
    } else {
        value.pointer(rest)
    }
}

/// Textual form of a resolved node
pub(crate) fn node_text(node: &Value) -> Option<String> {
    match node {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
