//! # Mobile Log MCP Server
//!
//! Model Context Protocol server for capturing mobile device logs during
//! test automation.
//!
//! ## Overview
//!
//! This server provides MCP tools for:
//! - Starting per-session log capture (adb logcat, iOS log stream / syslog)
//! - Reading the buffered tail of captured lines
//! - Clearing buffers and stopping captures
//! - Listing active capture sessions
//!
//! ## Architecture
//!
//! This is Layer 3 - the main MCP server binary that ties together:
//! - mobile-log-mcp-core: Core types
//! - mobile-log-mcp-capture: Buffering and process spawning
//! - mobile-log-mcp-session: Session lifecycle

use rmcp::{transport::stdio, ServiceExt};

use mobile_log_mcp::MobileLogMcpServer;
use mobile_log_mcp_core::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let config = match args.iter().position(|arg| arg == "--config") {
        Some(i) => {
            let path = args
                .get(i + 1)
                .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
            ServerConfig::from_file(path)?
        }
        None => ServerConfig::default(),
    };

    // Initialize logging; RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.server.log_level.clone())
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Mobile Log MCP Server starting...");

    let server = MobileLogMcpServer::with_config(config)?;

    tracing::info!("Server initialized, starting stdio transport...");

    // Serve the MCP server over stdio
    let service = server.serve(stdio()).await.map_err(|e| {
        tracing::error!("Error starting server: {}", e);
        e
    })?;

    tracing::info!("Mobile Log MCP Server running on stdio");

    // Wait for the service to complete
    service.waiting().await?;

    tracing::info!("Mobile Log MCP Server shutting down");

    Ok(())
}
