//! Control server binary entry point.
//!
//! Starts the streamgate HTTP control plane for the external stream worker.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (0.0.0.0:5000, worker `python`)
//! cargo run -p streamgate-control-server
//!
//! # Point at a real worker script with a default stream
//! WORKER_ARGS="model/stream_worker.py" STREAM_URL="rtsp://camera/live" \
//!     cargo run -p streamgate-control-server
//! ```
//!
//! # Environment Variables
//!
//! - `PORT`: Listening port (default: `5000`)
//! - `HTTP_BIND_ADDRESS`: Full bind address; overrides `PORT` (default: `0.0.0.0:<PORT>`)
//! - `WORKER_EXECUTABLE`: Worker program (default: `python`)
//! - `WORKER_ARGS`: Whitespace-separated fixed arguments placed before the stream URL
//! - `STREAM_URL`: Default stream URL for start requests that carry none
//! - `RUST_LOG`: Logging level (default: `info`)

use std::sync::Arc;

use streamgate_control_server::api::{self, AppState};
use streamgate_core::{LauncherConfig, WorkerLauncher, WorkerRegistry};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let bind_address =
        std::env::var("HTTP_BIND_ADDRESS").unwrap_or_else(|_| format!("0.0.0.0:{}", port));
    let config = LauncherConfig::from_env();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %bind_address,
        worker = %config.program.display(),
        "streamgate control server starting"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name("streamgate-http")
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let registry = Arc::new(WorkerRegistry::new());
        let launcher = Arc::new(WorkerLauncher::new(config, registry.clone()));

        let state = AppState {
            launcher: launcher.clone(),
            registry,
        };
        let router = api::router(state);

        let addr: std::net::SocketAddr = bind_address.parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("control server ready - listening for connections");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        // Leave no orphaned workers behind.
        launcher.stop_all().await;

        Ok::<(), anyhow::Error>(())
    })?;

    info!("control server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}
