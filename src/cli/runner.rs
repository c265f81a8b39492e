//! CLI runner - executes commands

use crate::api::RestApiManager;
use crate::cli::commands::{Cli, Commands};
use crate::config::ClientSettings;
use crate::error::{Error, Result};
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    ///
    /// Ctrl-C cancels every request still in flight.
    pub async fn run(&self) -> Result<()> {
        let api = self.build_api()?;
        let cancel = CancellationToken::new();

        let ctrl_c = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupted, cancelling requests");
                    cancel.cancel();
                }
            })
        };

        let result = self.execute(&api, &cancel).await;
        ctrl_c.abort();
        result
    }

    async fn execute(&self, api: &RestApiManager, cancel: &CancellationToken) -> Result<()> {
        match &self.cli.command {
            Commands::Groups => {
                let count = emit_stream(api.groups(cancel.clone())).await?;
                self.log_count("groups", count);
            }
            Commands::Connectors { group_id } => {
                let count = emit_stream(api.connectors(group_id, cancel.clone())).await?;
                self.log_count("connectors", count);
            }
            Commands::Schemas { connector_id } => {
                match api.connector_schemas(connector_id, cancel).await? {
                    Some(schemas) => emit(&schemas)?,
                    None => debug!(connector_id = %connector_id, "No schema configuration returned"),
                }
            }
        }
        Ok(())
    }

    fn build_api(&self) -> Result<RestApiManager> {
        let mut settings = match &self.cli.config {
            Some(path) => ClientSettings::load(path)?,
            None => ClientSettings::default(),
        };
        if let Some(base_url) = &self.cli.base_url {
            settings.base_url.clone_from(base_url);
        }
        if let Some(max) = self.cli.max_concurrent {
            settings.max_concurrent_requests = max;
        }

        let api_key = self
            .cli
            .api_key
            .clone()
            .ok_or_else(|| Error::config("Missing API key (--api-key or FIVETRAN_API_KEY)"))?;
        let api_secret = self.cli.api_secret.clone().ok_or_else(|| {
            Error::config("Missing API secret (--api-secret or FIVETRAN_API_SECRET)")
        })?;

        let base_url = settings.base_url.clone();
        let options = settings.into_options()?;
        if self.cli.verbose {
            eprintln!(
                "Using {base_url} (timeout {}s, max concurrent {})",
                options.timeout.as_secs(),
                options.max_concurrent_requests
            );
        }

        RestApiManager::with_base_url(&base_url, api_key, api_secret, options)
    }

    fn log_count(&self, kind: &str, count: usize) {
        if self.cli.verbose {
            eprintln!("Fetched {count} {kind}");
        }
        info!(kind, count, "Listing complete");
    }
}

/// Print every item as one JSON line, stopping at the first error
async fn emit_stream<T, S>(stream: S) -> Result<usize>
where
    T: Serialize,
    S: Stream<Item = Result<T>> + Unpin,
{
    let mut stream = stream;
    let mut count = 0;
    while let Some(item) = stream.next().await {
        emit(&item?)?;
        count += 1;
    }
    Ok(count)
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    let line = serde_json::to_string(value)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")?;
    Ok(())
}
