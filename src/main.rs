use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{error, info};

use flashcard_quiz::{
    config::Config,
    create_router,
    grader::{FastEmbedder, Grader},
    middleware::init_tracing,
    store::create_store,
    AppState,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => {
            info!("Configuration loaded successfully (production: {})", config.environment.is_production());
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Connect (and migrate) the configured store
    let store = match create_store(&config.store).await {
        Ok(store) => {
            info!("Store initialized");
            store
        }
        Err(e) => {
            error!("Failed to initialize store: {}", e);
            std::process::exit(1);
        }
    };

    // Load the embedding model once; model files may be downloaded on first start
    let embedding_config = config.embedding.clone();
    let embedder = match tokio::task::spawn_blocking(move || FastEmbedder::new(&embedding_config)).await {
        Ok(Ok(embedder)) => {
            info!("Embedding model {} loaded", embedder.name());
            embedder
        }
        Ok(Err(e)) => {
            error!("Failed to load embedding model: {:#}", e);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Embedding model loader panicked: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(store, Grader::new(Arc::new(embedder)));
    let app = create_router(state, &config.http);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("Server listening on {}", addr);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Start the server with graceful shutdown handling
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
/// Listens for SIGTERM and SIGINT signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        },
    }
}
