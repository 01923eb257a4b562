//! Request builder
//!
//! Holds everything needed to send one HTTP request. Parameter values are kept
//! as JSON values so that pagination can rewrite them through scoped pointers
//! without knowing the endpoint's concrete parameter types.

use super::template;
use crate::error::Result;
use crate::pointer::node_text;
use crate::types::{JsonValue, Method, ParamMap};
use bytes::Bytes;
use std::collections::BTreeMap;
use url::Url;

/// An opaque file or stream payload
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileWrapper {
    /// Raw content
    pub content: Bytes,
    /// Optional file name sent with multipart/form uploads
    pub file_name: Option<String>,
    /// Optional content type
    pub content_type: Option<String>,
}

impl FileWrapper {
    /// Wrap raw content
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Set the file name
    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Set the content type
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// A single form field
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    /// A structured value
    Value(JsonValue),
    /// A file upload
    File(FileWrapper),
}

/// Request body
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// JSON body (objects, arrays or scalars)
    Json(JsonValue),
    /// Form fields
    Form(BTreeMap<String, FormField>),
    /// Opaque binary payload
    Binary(FileWrapper),
}

impl RequestBody {
    /// Check if there is no body
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// State of a not-yet-sent request
///
/// Cloning is cheap enough to do once per page; pagination strategies derive
/// each next request from a clone of the previous one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestBuilder {
    pub(super) method: Method,
    pub(super) path: String,
    pub(super) template_params: ParamMap,
    pub(super) query_params: ParamMap,
    pub(super) headers: ParamMap,
    pub(super) body: RequestBody,
}

impl RequestBuilder {
    /// Create a request for a method and path template (e.g. `/users/{id}/items`)
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    /// Create a GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Set a path-template parameter
    #[must_use]
    pub fn template_param(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.template_params.insert(name.into(), value.into());
        self
    }

    /// Set a query parameter
    #[must_use]
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Set a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set a JSON body
    #[must_use]
    pub fn json_body(mut self, body: JsonValue) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Add a form field, switching the body to a form if needed
    #[must_use]
    pub fn form_param(self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.form_field(name, FormField::Value(value.into()))
    }

    /// Add a file form field
    #[must_use]
    pub fn form_file(self, name: impl Into<String>, file: FileWrapper) -> Self {
        self.form_field(name, FormField::File(file))
    }

    /// Set an opaque binary body
    #[must_use]
    pub fn binary_body(mut self, file: FileWrapper) -> Self {
        self.body = RequestBody::Binary(file);
        self
    }

    fn form_field(mut self, name: impl Into<String>, field: FormField) -> Self {
        if let RequestBody::Form(fields) = &mut self.body {
            fields.insert(name.into(), field);
        } else {
            self.body = RequestBody::Form(BTreeMap::from([(name.into(), field)]));
        }
        self
    }

    /// HTTP method
    pub fn method(&self) -> Method {
        self.method
    }

    /// Path template
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path-template parameters
    pub fn template_parameters(&self) -> &ParamMap {
        &self.template_params
    }

    /// Query parameters
    pub fn query_parameters(&self) -> &ParamMap {
        &self.query_params
    }

    /// Headers
    pub fn headers(&self) -> &ParamMap {
        &self.headers
    }

    /// Body
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Get a query parameter value
    pub fn query_value(&self, name: &str) -> Option<&JsonValue> {
        self.query_params.get(name)
    }

    /// Get a header value (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&JsonValue> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Derive a request with the given query parameters added or replaced
    #[must_use]
    pub fn with_query_parameters<I, K>(&self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, JsonValue)>,
        K: Into<String>,
    {
        let mut next = self.clone();
        next.query_params
            .extend(params.into_iter().map(|(key, value)| (key.into(), value)));
        next
    }

    /// Render the path template with the template parameters
    pub fn render_path(&self) -> Result<String> {
        template::render_path(&self.path, &self.template_params)
    }

    /// Flatten query parameters into key/value pairs
    ///
    /// Nulls are skipped, arrays repeat the key, objects use `key[field]`.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.query_params {
            flatten_param(key, value, &mut pairs);
        }
        pairs
    }

    /// Flatten the value fields of a form body; file fields are skipped
    pub fn form_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let RequestBody::Form(fields) = &self.body {
            for (name, field) in fields {
                if let FormField::Value(value) = field {
                    flatten_param(name, value, &mut pairs);
                }
            }
        }
        pairs
    }

    /// Flatten headers into name/value pairs; arrays are comma-joined
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .filter_map(|(name, value)| {
                let text = match value {
                    JsonValue::Array(items) => {
                        let parts: Vec<String> = items.iter().filter_map(node_text).collect();
                        Some(parts.join(","))
                    }
                    other => node_text(other),
                };
                text.map(|text| (name.clone(), text))
            })
            .collect()
    }

    /// Build the full request URL against a base URL
    pub fn build_url(&self, base_url: &str) -> Result<Url> {
        let path = self.render_path()?;
        let full = if path.starts_with("http://") || path.starts_with("https://") {
            path
        } else {
            let base = base_url.trim_end_matches('/');
            let path = path.trim_start_matches('/');
            format!("{base}/{path}")
        };

        let mut url = Url::parse(&full)?;
        let pairs = self.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }
}

fn flatten_param(key: &str, value: &JsonValue, out: &mut Vec<(String, String)>) {
    match value {
        JsonValue::Null => {}
        JsonValue::Array(items) => {
            for item in items {
                match item {
                    JsonValue::Array(_) | JsonValue::Object(_) => {
                        out.push((key.to_string(), item.to_string()));
                    }
                    scalar => flatten_param(key, scalar, out),
                }
            }
        }
        JsonValue::Object(fields) => {
            for (field, nested) in fields {
                flatten_param(&format!("{key}[{field}]"), nested, out);
            }
        }
        scalar => {
            if let Some(text) = node_text(scalar) {
                out.push((key.to_string(), text));
            }
        }
    }
}
