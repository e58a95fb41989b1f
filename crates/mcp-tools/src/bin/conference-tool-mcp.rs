//! Conference tool service entry point
//!
//! Spawned by the chat server per turn (stdio) or run standalone as a shared
//! HTTP endpoint.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use confhub_common::{init_tracing, shutdown_tracer, LogTarget, SystemConfig};
use confhub_mcp_tools::{http::serve_http, register_all_tools, stdio::serve_stdio, ToolService};
use std::net::SocketAddr;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    Http,
}

#[derive(Parser)]
#[command(name = "conference-tool-mcp")]
#[command(version)]
#[command(about = "Conference search tool service (JSON-RPC over stdio or HTTP)")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Transport to serve on
    #[arg(short, long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Address to bind in http mode; defaults to `tool.http_bind`
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SystemConfig::load_config(&cli.config)?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    // stdout carries protocol messages in stdio mode
    let target = match (cli.transport, &config.logging.log_dir) {
        (Transport::Stdio, Some(dir)) => LogTarget::File {
            dir: dir.clone(),
            file_name: format!("conference_tool_{}.log", std::process::id()),
        },
        (Transport::Stdio, None) => LogTarget::Stderr,
        (Transport::Http, _) => LogTarget::Stdout,
    };
    let _guard = init_tracing("conference-tool-mcp", &config.logging, target)?;

    info!(
        pid = std::process::id(),
        transport = ?cli.transport,
        upstream = %config.conference_api.base_url,
        "Conference tool service starting"
    );

    let tools = register_all_tools(&config.conference_api)?;
    let service = ToolService::new(tools);

    let result = match cli.transport {
        Transport::Stdio => serve_stdio(service).await.context("stdio transport failed"),
        Transport::Http => {
            let bind = match cli.bind {
                Some(bind) => bind,
                None => config
                    .tool
                    .http_bind
                    .parse()
                    .with_context(|| format!("invalid tool.http_bind: {}", config.tool.http_bind))?,
            };
            serve_http(service, bind).await
        }
    };

    if let Err(e) = &result {
        error!(error = %e, "Conference tool service stopped with an error");
    } else {
        info!("Conference tool service stopped");
    }
    shutdown_tracer();
    result
}
