//! CLI module
//!
//! Command-line interface for running endpoint definitions.
//!
//! # Commands
//!
//! - `paginate` - Stream records (or pages) of an endpoint
//! - `validate` - Check an endpoint definition

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
