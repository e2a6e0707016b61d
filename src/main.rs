use std::process;
use std::sync::Arc;

use clap::Parser;
use rmcp::ServiceExt;

use syncable_mcp::cli::Cli;
use syncable_mcp::collaborators::{Collaborators, unconfigured};
use syncable_mcp::config;
use syncable_mcp::dispatch::Dispatcher;
use syncable_mcp::server::McpToolServer;
use syncable_mcp::templates::BuiltinTemplateProvider;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Stdin/stdout pair the stdio transport reads and writes framed MCP
/// messages on. Nothing else may write to stdout once the server starts.
fn stdio() -> (tokio::io::Stdin, tokio::io::Stdout) {
    (tokio::io::stdin(), tokio::io::stdout())
}

/// Every collaborator defaults to its `unconfigured` stand-in so the server
/// starts and lists its full tool catalog with zero external infrastructure;
/// each stand-in fails its own calls with a `Backend` error naming the knob
/// a real deployment would wire up instead. See DESIGN.md for why this
/// exercise stops short of wiring a real sampling/docker/k8s backend.
fn default_collaborators() -> Collaborators {
    Collaborators {
        sampling_client: Some(Arc::new(unconfigured::UnconfiguredSampling)),
        template_provider: Some(Arc::new(BuiltinTemplateProvider)),
        docker_client: Some(Arc::new(unconfigured::UnconfiguredDocker)),
        k8s_client: Some(Arc::new(unconfigured::UnconfiguredKubernetes)),
        cert_scanner: Some(Arc::new(unconfigured::UnconfiguredCertScanner)),
    }
}

async fn run() -> syncable_mcp::Result<()> {
    let cli = Cli::parse();
    cli.init_logging();

    let project_path = cli.path.clone().unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let config = match &cli.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(syncable_mcp::error::AppError::from)?
        }
        None => config::load_config(Some(&project_path))?,
    };

    log::info!("syncable-mcp {} starting, project path {}", syncable_mcp::VERSION, project_path.display());

    let dispatcher = Dispatcher::new(default_collaborators(), config)?;
    let server = McpToolServer::new(Arc::new(dispatcher));

    let running = server.serve(stdio()).await.map_err(|e| syncable_mcp::error::AppError::backend(e.to_string()))?;
    log::info!("MCP server running on stdio, waiting for client requests");

    running.waiting().await.map_err(|e| syncable_mcp::error::AppError::backend(e.to_string()))?;
    log::info!("MCP server shutting down");

    Ok(())
}
