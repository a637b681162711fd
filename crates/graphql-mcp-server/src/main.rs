use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use graphql_mcp_server::server::Server;
use runtime::logging::{Logging, LoggingLayerBuilder};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

mod runtime;

/// Clap styling
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Arguments to the MCP server
#[derive(Debug, clap::Parser)]
#[command(
    version,
    styles = STYLES,
    about = "GraphQL MCP Server - expose a GraphQL API as MCP tools",
)]
struct Args {
    /// Path to the config file
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => runtime::read_config(path)
            .with_context(|| format!("Could not load config from {}", path.display()))?,
        None => runtime::read_config_from_env().context("Could not load config")?,
    };

    let (logging_layer, _logging_guard) = LoggingLayerBuilder::new().build(&config.logging)?;
    tracing_subscriber::registry()
        .with(logging_layer)
        .with(Logging::env_filter(&config.logging)?)
        .try_init()?;

    info!("GraphQL MCP Server v{}", env!("CARGO_PKG_VERSION"));
    if args.config.is_none() {
        warn!("No config file provided, using environment variables and defaults");
    }

    Server::builder()
        .schema_source(config.schema_source())
        .endpoint(config.endpoint.clone())
        .headers(config.headers.clone())
        .policy(config.tool_policy())
        .execute_introspection(config.introspection.execute.enabled)
        .introspect_introspection(config.introspection.introspect.enabled)
        .maybe_reload_interval(config.reload_interval)
        .build()
        .start()
        .await?;

    Ok(())
}
