//! Request module
//!
//! Provides the request-state object the pagination engine operates on:
//! - Builder-style construction (method, path template, query, headers, body)
//! - URL building (path template rendering, query flattening)
//! - Pointer-addressed rewrites of a single value (`update_by_reference`)

mod builder;
mod mutator;
pub mod template;

pub(crate) use mutator::rematerialize;

pub use builder::{FileWrapper, FormField, RequestBody, RequestBuilder};

#[cfg(test)]
mod tests;
