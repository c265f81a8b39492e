//! CLI module
//!
//! Command-line interface over `RestApiManager`.
//!
//! # Commands
//!
//! - `groups` - List all groups
//! - `connectors` - List the connectors of a group
//! - `schemas` - Show the schema configuration of a connector

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
