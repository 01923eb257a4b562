//! Scoped pointer types
//!
//! A scoped pointer is an address of the form `<scope>#<json-pointer>`, for
//! example `$request.query#/offset` or `$response.body#/meta/next_cursor`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the scope token and the JSON pointer
pub const SCOPE_SEPARATOR: char = '#';

/// Document addressed by a scoped pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Query parameters of the outgoing request
    RequestQuery,
    /// Headers of the outgoing request
    RequestHeader,
    /// Path-template parameters of the outgoing request
    RequestPath,
    /// Body of the outgoing request
    RequestBody,
    /// Body of the received response
    ResponseBody,
    /// Headers of the received response
    ResponseHeaders,
}

impl Scope {
    /// All scopes, request side first
    pub const ALL: [Scope; 6] = [
        Scope::RequestQuery,
        Scope::RequestHeader,
        Scope::RequestPath,
        Scope::RequestBody,
        Scope::ResponseBody,
        Scope::ResponseHeaders,
    ];

    /// The textual scope token used in addresses
    pub fn token(self) -> &'static str {
        match self {
            Scope::RequestQuery => "$request.query",
            Scope::RequestHeader => "$request.headers",
            Scope::RequestPath => "$request.path",
            Scope::RequestBody => "$request.body",
            Scope::ResponseBody => "$response.body",
            Scope::ResponseHeaders => "$response.headers",
        }
    }

    /// Look up a scope by its token
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scope| scope.token() == token)
    }

    /// Whether this scope addresses the outgoing request
    pub fn is_request(self) -> bool {
        matches!(
            self,
            Scope::RequestQuery | Scope::RequestHeader | Scope::RequestPath | Scope::RequestBody
        )
    }

    /// Whether this scope addresses the received response
    pub fn is_response(self) -> bool {
        !self.is_request()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Reasons an address fails to parse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address '{0}' has no '#' separator")]
    MissingSeparator(String),

    #[error("unknown scope '{0}'")]
    UnknownScope(String),

    #[error("address '{0}' has an empty pointer")]
    EmptyPath(String),

    #[error("pointer '{0}' must start with '/'")]
    RelativePath(String),
}

/// A parsed `scope#pointer` address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedPointer {
    scope: Scope,
    path: String,
}

impl ScopedPointer {
    /// Create a pointer from its parts, validating the path
    pub fn new(scope: Scope, path: impl Into<String>) -> Result<Self, AddressError> {
        let path = path.into();
        if path.is_empty() {
            return Err(AddressError::EmptyPath(format!("{scope}#")));
        }
        if !path.starts_with('/') {
            return Err(AddressError::RelativePath(path));
        }
        Ok(Self { scope, path })
    }

    /// Parse an address such as `$request.query#/page`
    pub fn parse(address: &str) -> Result<Self, AddressError> {
        let (token, path) = address
            .split_once(SCOPE_SEPARATOR)
            .ok_or_else(|| AddressError::MissingSeparator(address.to_string()))?;

        if path.is_empty() {
            return Err(AddressError::EmptyPath(address.to_string()));
        }

        let scope =
            Scope::from_token(token).ok_or_else(|| AddressError::UnknownScope(token.to_string()))?;

        Self::new(scope, path)
    }

    /// The addressed document
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The RFC 6901 pointer into the document
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Split the pointer into its first (unescaped) token and the remaining pointer.
    ///
    /// `/filter/page` yields `("filter", "/page")`; `/page` yields `("page", "")`.
    pub fn split_first(&self) -> (String, &str) {
        split_first_token(&self.path)
    }
}

impl FromStr for ScopedPointer {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScopedPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.scope, SCOPE_SEPARATOR, self.path)
    }
}

/// Split a pointer that starts with `/` into its first token and the remainder
pub(crate) fn split_first_token(path: &str) -> (String, &str) {
    let rest = path.strip_prefix('/').unwrap_or(path);
    match rest.find('/') {
        Some(idx) => (unescape_token(&rest[..idx]), &rest[idx..]),
        None => (unescape_token(rest), ""),
    }
}

/// Undo RFC 6901 escaping (`~1` is `/`, `~0` is `~`)
fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Outcome of reading or writing through a scoped pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The address resolved
    Resolved(T),
    /// The address is well formed but nothing usable lives there
    NotFound,
    /// The address is malformed or not legal for this operation
    Invalid,
}

impl<T> Resolution<T> {
    /// Convert to an `Option`, folding both failure kinds into `None`
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::NotFound | Self::Invalid => None,
        }
    }

    /// Check if the address resolved
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Check if the address was malformed or illegal
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }

    /// Map the resolved value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Self::Resolved(value) => Resolution::Resolved(f(value)),
            Self::NotFound => Resolution::NotFound,
            Self::Invalid => Resolution::Invalid,
        }
    }

    /// Chain another fallible lookup on the resolved value
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Resolution<U>) -> Resolution<U> {
        match self {
            Self::Resolved(value) => f(value),
            Self::NotFound => Resolution::NotFound,
            Self::Invalid => Resolution::Invalid,
        }
    }
}

impl<T> From<Option<T>> for Resolution<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotFound, Self::Resolved)
    }
}
