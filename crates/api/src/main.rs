use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mangaledger_api::config::ServerConfig;
use mangaledger_api::router::build_app_router;
use mangaledger_api::state::AppState;
use mangaledger_content::{CachedSource, ContentFetcher, ContentSource, GatewayClient};
use mangaledger_history::{DisabledEventLog, EventLog, HistoryWalker, HttpEventLog};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mangaledger_api=debug,mangaledger_history=debug,mangaledger_content=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Content gateway ---
    let gateway = GatewayClient::new(&config.gateway).expect("Failed to build gateway client");
    let source: Arc<dyn ContentSource> = if config.content_cache {
        Arc::new(CachedSource::new(gateway, config.content_cache_capacity))
    } else {
        Arc::new(gateway)
    };
    tracing::info!(
        gateway = %config.gateway.base_url,
        cache = config.content_cache,
        cache_capacity = config.content_cache_capacity.get(),
        "Content gateway configured",
    );
    let fetcher = ContentFetcher::new(source, config.gateway.base_url.clone());

    // --- Event log ---
    let event_log: Arc<dyn EventLog> = match HttpEventLog::connect(&config.event_log) {
        Ok(log) => Arc::new(log),
        Err(e) => {
            tracing::warn!(error = %e, "Event log unavailable, entity lookups will fail");
            Arc::new(DisabledEventLog::new(e.to_string()))
        }
    };

    // --- App state ---
    let walker = HistoryWalker::with_options(fetcher, event_log, config.walk.clone());
    let state = AppState {
        config: Arc::new(config.clone()),
        walker,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
