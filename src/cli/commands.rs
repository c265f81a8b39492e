//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fivetran REST API client
#[derive(Parser, Debug)]
#[command(name = "fivetran-client")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API key
    #[arg(long, env = "FIVETRAN_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// API secret
    #[arg(long, env = "FIVETRAN_API_SECRET", global = true, hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Client settings file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Override the maximum number of concurrent requests (0 = unbounded)
    #[arg(long, global = true)]
    pub max_concurrent: Option<u16>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List all groups
    Groups,

    /// List the connectors of a group
    Connectors {
        /// Group identifier
        group_id: String,
    },

    /// Show the schema configuration of a connector
    Schemas {
        /// Connector identifier
        connector_id: String,
    },
}
