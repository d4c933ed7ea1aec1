//! Contex Server - HTTP REST API for the semantic context router
//!
//! This binary exposes the ingest → embed → match → fan-out pipeline via
//! REST endpoints, with narrow collaborator traits (identity, tenancy,
//! authorization, quota) that a real deployment wires to its own stack.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}
