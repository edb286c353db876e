//! MSSQL query gateway entry point.
//!
//! Serves the gateway tools over stdio. Logs go to stderr; stdout carries
//! JSON-RPC only.

use anyhow::{Context, Result};
use mssql_query_gateway::MssqlGatewayServer;
use rmcp::ServiceExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_logging();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] {}", info);
    }));

    if let Err(e) = run().await {
        error!("Server critical failure: {:#}", e);
        eprintln!(
            "{}",
            serde_json::json!({
                "status": "error",
                "message": format!("Server critical failure: {:#}", e),
            })
        );
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("MSSQL Query Gateway v{version} starting...");
    eprintln!("Transport: stdio");

    let server = MssqlGatewayServer::from_env();
    info!(
        "Server initialized with {} connection(s)",
        server.connection_names().len()
    );

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start the stdio service")?;

    tokio::select! {
        quit_reason = service.waiting() => {
            let reason = quit_reason.context("service loop failed")?;
            info!("Service stopped: {:?}", reason);
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    eprintln!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Initialize tracing subscriber with stderr output.
///
/// Logs MUST go to stderr because stdout is used for JSON-RPC communication.
fn init_logging() {
    let filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn,mssql_query_gateway=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
