//! CLI runner - executes commands

use crate::api::{records_extractor, ApiCall, Extractor};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::loader::{load_endpoint, EndpointDefinition};
use crate::types::JsonValue;
use futures::StreamExt;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, printing to stdout
    pub async fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(&mut out).await
    }

    /// Run the CLI command, printing to `out`
    pub async fn run_with_output<W: Write>(&self, out: &mut W) -> Result<()> {
        match &self.cli.command {
            Commands::Paginate { max_items, pages } => {
                self.paginate(out, *max_items, *pages).await
            }
            Commands::Validate => self.validate(out),
        }
    }

    /// Load endpoint definition
    fn load_endpoint(&self) -> Result<EndpointDefinition> {
        let path = self
            .cli
            .endpoint
            .as_ref()
            .ok_or_else(|| Error::config("Endpoint file not specified (use -e flag)"))?;
        load_endpoint(path)
    }

    /// Validate endpoint definition
    fn validate<W: Write>(&self, out: &mut W) -> Result<()> {
        let endpoint = self.load_endpoint()?;

        self.output_message(
            out,
            &json!({
                "type": "LOG",
                "log": {
                    "level": "INFO",
                    "message": format!(
                        "Endpoint '{}' is valid with {} pagination strategies",
                        endpoint.name,
                        endpoint.pagination.len()
                    )
                }
            }),
        )
    }

    /// Fetch pages and print records
    async fn paginate<W: Write>(
        &self,
        out: &mut W,
        max_items: Option<usize>,
        pages: bool,
    ) -> Result<()> {
        let endpoint = self.load_endpoint()?;
        let client = HttpClient::with_config(endpoint.http_config())?;

        let token = CancellationToken::new();
        let watched = token.clone();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                watched.cancel();
            }
        });

        let call = endpoint
            .api_call(Arc::new(client))?
            .with_cancellation(token);
        let extractor = records_extractor(endpoint.records.as_deref())?;
        let limit = max_items.unwrap_or(usize::MAX);

        let result = if endpoint.pagination.is_empty() {
            self.print_single(out, &call, extractor, limit).await
        } else if pages {
            self.print_pages(out, &call, extractor, limit).await
        } else {
            self.print_items(out, &call, extractor, limit).await
        };

        ctrl_c.abort();
        result
    }

    /// One request, no pagination configured
    async fn print_single<W: Write>(
        &self,
        out: &mut W,
        call: &ApiCall,
        mut extractor: Extractor<JsonValue, JsonValue>,
        limit: usize,
    ) -> Result<()> {
        let body: JsonValue = call.execute().await?;
        let records = extractor(&body).unwrap_or_default();

        let mut count = 0;
        for record in records.into_iter().take(limit) {
            self.output_message(out, &record)?;
            count += 1;
        }

        info!("Printed {} records from a single request", count);
        Ok(())
    }

    async fn print_items<W: Write>(
        &self,
        out: &mut W,
        call: &ApiCall,
        extractor: Extractor<JsonValue, JsonValue>,
        limit: usize,
    ) -> Result<()> {
        let mut stream = Box::pin(call.items(extractor)?);

        let mut count = 0;
        while count < limit {
            let Some(record) = stream.next().await else {
                break;
            };
            self.output_message(out, &record?)?;
            count += 1;
        }

        info!(
            "Printed {} records from {} pages",
            count,
            stream.pages_fetched()
        );
        Ok(())
    }

    async fn print_pages<W: Write>(
        &self,
        out: &mut W,
        call: &ApiCall,
        extractor: Extractor<JsonValue, JsonValue>,
        limit: usize,
    ) -> Result<()> {
        let mut stream = Box::pin(call.pages(extractor)?);

        let mut count = 0;
        while count < limit {
            let Some(page) = stream.next().await else {
                break;
            };
            let page = page?;
            let take = page.len().min(limit - count);
            count += take;

            self.output_message(
                out,
                &json!({
                    "page": stream.pages_fetched(),
                    "status": page.response.status(),
                    "metadata": page.metadata,
                    "items": &page.items[..take],
                }),
            )?;
        }

        info!(
            "Printed {} records from {} pages",
            count,
            stream.pages_fetched()
        );
        Ok(())
    }

    /// Output a message
    fn output_message<W: Write>(&self, out: &mut W, msg: &JsonValue) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(msg)?,
        };
        writeln!(out, "{line}")?;
        Ok(())
    }
}
