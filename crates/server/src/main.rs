//! Tessera demo server
//!
//! Serves JSON:API listings of a small in-memory blog.

mod demo;

use clap::Parser;
use tessera_jsonapi::{ServerConfig, create_app, init_logging};
use tracing::info;

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        base_url = %config.base_url,
        default_page_size = config.default_page_size,
        max_page_size = config.max_page_size,
        "Starting Tessera JSON:API server"
    );

    let api = demo::blog_api(&config)?;
    let app = create_app(api, config.clone());
    serve(app, &config).await
}
