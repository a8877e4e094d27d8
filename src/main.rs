use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imposter::{
    api,
    config::AppConfig,
    controller::{ControllerOptions, GameController},
    words::StaticWordSource,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imposter=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting imposter...");

    let config = AppConfig::from_env();
    tracing::info!("Storing game data in {}", config.data_path.display());

    let word_source = match config.build_word_source() {
        Ok(source) => {
            tracing::info!("Word source '{}' initialized", source.name());
            source
        }
        Err(e) => {
            tracing::warn!(
                "Failed to initialize word source: {}. Using built-in word lists.",
                e
            );
            Arc::new(StaticWordSource::new())
        }
    };

    let controller = Arc::new(GameController::new(
        config.build_store(),
        word_source,
        ControllerOptions::from(&config),
    ));

    let app = api::router(controller)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", config.bind_addr);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
