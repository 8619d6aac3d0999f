//! OCI MCP tool server.
//!
//! Exposes the registry client as three tools (`ping`, `list_oci_tags`,
//! `get_oci_details`) and four prompt templates over JSON-RPC 2.0.
//!
//! ```text
//! stdin/stdout (NDJSON) ─┐
//!                        ├─► McpServer ─► ToolRegistry ─► RegistryClient
//! POST /mcp (HTTP)      ─┘             └► prompts
//! ```

pub mod cli;
pub mod prompts;
pub mod rpc;
pub mod tools;
pub mod transport;

use std::sync::Arc;

use anyhow::Context;

use oci_mcp_core::{ServerConfig, Transport};
use oci_mcp_registry::RegistryClient;

pub use rpc::McpServer;

/// Name reported in `initialize` responses.
pub const SERVER_NAME: &str = "mcp-oci-registry";

/// Validate the configuration and serve on the selected transport until
/// the client disconnects (stdio) or the process is interrupted (HTTP).
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let client = RegistryClient::new(&config.registry)?;
    let server = Arc::new(McpServer::new(client));

    tracing::info!(
        transport = %config.transport,
        version = oci_mcp_core::VERSION,
        "Starting OCI MCP server"
    );

    match config.transport {
        Transport::Stdio => {
            transport::stdio::serve(server, tokio::io::stdin(), tokio::io::stdout()).await
        }
        Transport::Http => {
            let address = config.bind_address();
            let listener = std::net::TcpListener::bind(&address)
                .with_context(|| format!("Failed to bind {}", address))?;
            transport::http::serve(server, listener, shutdown_signal()).await
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
