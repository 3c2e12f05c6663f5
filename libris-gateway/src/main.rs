//! Entry point for the `libris-gateway` HTTP server.

use std::sync::Arc;

use clap::Parser;
use libris_gateway::{create_router, GatewayConfig, GatewayState, HttpUpstream};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayConfig::parse();

    let upstream = match HttpUpstream::new(config.upstream_base.clone()) {
        Ok(u) => u,
        Err(e) => {
            tracing::error!(error = %e, "failed to build upstream client");
            std::process::exit(1);
        }
    };
    let state = GatewayState::new(Arc::new(upstream), config.content_type_policy());
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %config.listen_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(
        addr = %config.listen_addr,
        upstream = %config.upstream_base,
        content_type = ?config.content_type_policy(),
        "libris-gateway listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
