#![doc = include_str!("../README.md")]

mod server;

use clap::Parser;
use remotecmd::Service;
use server::config::{CliArgs, ServerConfig};
use server::telemetry::init_telemetry;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;

    let service = server::commands::register_all(Service::builder(), &config)?.build();

    let listener = TcpListener::bind(&config.server_addr).await?;
    log_startup_info(&listener, &config, &service);

    // Stops accepting connections; requests already in flight keep running.
    let stop_accepting = CancellationToken::new();
    let server = tokio::spawn(
        axum::serve(listener, server::http::router(service.clone()))
            .with_graceful_shutdown(stop_accepting.clone().cancelled_owned())
            .into_future(),
    );

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, terminating gracefully...");
    stop_accepting.cancel();

    let remaining = service.shutdown(config.shutdown_timeout).await?;
    if remaining > 0 {
        // Connections still blocked on abandoned commands would hold the
        // server open indefinitely.
        server.abort();
    }
    match server.await {
        Ok(served) => served?,
        Err(err) if err.is_cancelled() => {
            tracing::warn!("Abandoned {remaining} running commands");
        }
        Err(err) => return Err(err.into()),
    }

    tracing::info!("Service shut down successfully");
    providers.shutdown();
    Ok(())
}

fn log_startup_info(listener: &TcpListener, config: &ServerConfig, service: &Service) {
    let addr = listener
        .local_addr()
        .map_or_else(|_| config.server_addr.clone(), |addr| addr.to_string());
    if cfg!(debug_assertions) {
        tracing::info!(
            "Starting command service on {} with full config: {:#?}",
            addr,
            config
        );
    } else {
        tracing::info!(
            "Starting command service on {} with {} commands",
            addr,
            service.registry().len()
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
