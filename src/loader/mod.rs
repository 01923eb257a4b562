//! YAML Loader module
//!
//! Parse endpoint definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `EndpointDefinition` - Declarative description of one paginated API call
//! - `PaginationDefinition` - Strategy entries tagged by `type`
//! - YAML parsing with validation of addresses and path templates

mod parser;
mod types;

pub use parser::{load_endpoint, load_endpoint_from_str};
pub use types::{
    EndpointDefinition, HttpDefinition, PaginationDefinition, RequestDefinition,
};
