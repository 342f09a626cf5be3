//! Bankbox server entry point.
//!
//! Binds the WebSocket listener and runs until the process is terminated.
//! All state is in memory; a restart forgets every room.

use tracing_subscriber::EnvFilter;

use bankbox_server::BankboxServerBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("BANKBOX_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let server = BankboxServerBuilder::new().bind(&addr).build().await?;
    tracing::info!(%addr, "bankbox ready");

    server.run().await?;
    Ok(())
}
