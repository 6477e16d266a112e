//! 4get MCP Server
//!
//! Web, image, and news search through a 4get meta-search instance.
//!
//! # Configuration
//! Set `FOURGET_BASE_URL`, `FOURGET_PASS`, and the other `FOURGET_*` variables.
//!
//! Or configure in `.mcp.json`:
//! ```json
//! { "mcpServers": { "fourget": { "command": "./fourget-mcp" } } }
//! ```

use fourget_mcp::{logging, Config, FourGetMcpServer};
use rmcp::{transport::stdio, ServiceExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing("fourget_mcp")?;

    tracing::info!("Starting 4get MCP Server");

    let config = Config::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        cache_ttl_secs = config.cache_ttl_secs,
        max_retries = config.max_retries,
        pass_token = config.pass_token.is_some(),
        "Loaded configuration"
    );

    let server = FourGetMcpServer::new(config)?;
    let service = server.serve(stdio()).await?;

    tracing::info!("Server running, waiting for requests...");
    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
