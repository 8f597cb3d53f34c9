//! # Chirper
//!
//! Entry point for the chirper web service: loads configuration, wires up the
//! stores, identity provider and mailer, and serves the router until Ctrl-C.

use chirper::{build_router, get_server_port, AppConfig, AppState};
use log::{error, info};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Waits for Ctrl-C so the server can finish in-flight requests.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

/// Main entry point for the chirper web service.
///
/// # Logging
///
/// The application uses the `env_logger` crate for structured logging. Log levels
/// can be controlled via the `RUST_LOG` environment variable.
///
/// # Example Usage
///
/// ```bash
/// # Run with in-memory stores on port 3000
/// cargo run
///
/// # Run against PostgreSQL on a custom port
/// DATABASE_URL=postgres://localhost/chirper PORT=8080 cargo run
///
/// # Run with debug logging
/// RUST_LOG=debug cargo run
/// ```
#[tokio::main]
async fn main() {
    // Initialize the logging system
    env_logger::init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let state = match AppState::from_config(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize service: {}", e);
            std::process::exit(1);
        }
    };

    // Build the HTTP application with all routes and middleware
    let app = build_router(state, &config.static_dir)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    // Get the server port and bind address
    let port = get_server_port();
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    info!("Starting chirper server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("HTTP server error: {}", e);
    }
}
