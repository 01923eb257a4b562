//! Received HTTP response

use crate::error::{Error, Result};
use crate::types::JsonValue;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// A fully received HTTP response
///
/// The body is buffered so that both the item decoder and the pagination
/// strategies can look at it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HttpResponse {
    status: u16,
    headers: BTreeMap<String, String>,
    body: Bytes,
}

impl HttpResponse {
    /// Create a response with a status and body
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// All headers
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Get a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Raw body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as text (lossy UTF-8)
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Headers serialized as a JSON object
    pub fn headers_json(&self) -> String {
        let object: serde_json::Map<String, JsonValue> = self
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), JsonValue::String(value.clone())))
            .collect();
        JsonValue::Object(object).to_string()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::decode(format!("invalid JSON body: {e}")))
    }

    /// Buffer a reqwest response; repeated headers are joined with ", "
    pub async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();

        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        let body = response.bytes().await?;

        Ok(Self {
            status,
            headers,
            body,
        })
    }
}
