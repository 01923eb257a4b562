//! Scoped pointer module
//!
//! Addresses of the form `<scope>#<json-pointer>` identify one value inside a
//! request or a response without compile-time knowledge of either shape.
//!
//! # Overview
//!
//! | Scope token          | Document                         | Read | Write |
//! |----------------------|----------------------------------|------|-------|
//! | `$request.query`     | query parameters                 |      | yes   |
//! | `$request.headers`   | request headers                  |      | yes   |
//! | `$request.path`      | path-template parameters         |      | yes   |
//! | `$request.body`      | JSON or form body                |      | yes   |
//! | `$response.body`     | response body (JSON)             | yes  |       |
//! | `$response.headers`  | response headers (JSON object)   | yes  |       |
//!
//! Reads live here; writes are implemented on
//! [`RequestBuilder`](crate::request::RequestBuilder).

mod resolver;
mod types;

pub(crate) use resolver::node_text;
pub(crate) use types::split_first_token;

pub use resolver::{resolve, resolve_value};
pub use types::{AddressError, Resolution, Scope, ScopedPointer, SCOPE_SEPARATOR};

#[cfg(test)]
mod tests;
