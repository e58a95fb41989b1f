//! Chat server entry point
//!
//! Loads configuration, installs tracing and serves the streaming chat API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use confhub_api::ChatServer;
use confhub_common::{init_tracing, shutdown_tracer, LogTarget, SystemConfig, ToolTransportKind};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "chat-server")]
#[command(version)]
#[command(about = "Conference assistant chat API")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat server (default)
    Server {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// How to reach the conference tool service
        #[arg(long, value_parser = parse_transport)]
        tool_transport: Option<ToolTransportKind>,
    },
    /// Validate configuration and exit
    ValidateConfig,
}

fn parse_transport(value: &str) -> Result<ToolTransportKind, String> {
    match value {
        "stdio" => Ok(ToolTransportKind::Stdio),
        "http" => Ok(ToolTransportKind::Http),
        other => Err(format!("unknown transport '{}', expected stdio or http", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SystemConfig::load_config(&cli.config)?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    let _guard = init_tracing("chat-server", &config.logging, LogTarget::Stdout)?;

    info!("Chat server v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        manager_model = %config.agents.manager.model,
        specialist_model = %config.agents.specialist.model,
        tool_transport = ?config.tool.transport,
        "Configuration loaded"
    );

    let result = match cli.command {
        Some(Commands::ValidateConfig) => {
            println!("Configuration is valid");
            println!("  Manager model: {}", config.agents.manager.model);
            println!("  Specialist model: {}", config.agents.specialist.model);
            println!("  Tool transport: {:?}", config.tool.transport);
            if config.llm.api_key.is_none() {
                println!("  Warning: GEMINI_API_KEY is not set; chat turns will fail");
            }
            Ok(())
        }
        Some(Commands::Server { host, port, tool_transport }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(transport) = tool_transport {
                config.tool.transport = transport;
            }
            start_server(config).await
        }
        None => start_server(config).await,
    };

    if let Err(e) = &result {
        error!(error = %e, "Chat server stopped with an error");
    }
    shutdown_tracer();
    result
}

async fn start_server(config: SystemConfig) -> Result<()> {
    config.validate()?;
    config.require_api_key()?;
    ChatServer::new(config).run().await
}
