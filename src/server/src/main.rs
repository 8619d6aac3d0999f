//! OCI MCP server entry point.

use clap::Parser;

use oci_mcp_server::cli::Cli;

#[tokio::main]
async fn main() {
    let config = Cli::parse().into_config();
    oci_mcp_core::log::init(&config.log);

    if let Err(e) = oci_mcp_server::run(config).await {
        tracing::error!(error = %format!("{:#}", e), "Server exited with an error");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
