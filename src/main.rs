use anyhow::Context;
use review_sentiment_api::api::{self, AppState};
use review_sentiment_api::classifier::Sentiment;
use review_sentiment_api::config::AppConfig;
use review_sentiment_api::storage::ReviewStore;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("🚀 Starting Review Sentiment API Server");

    // Load configuration
    let config = AppConfig::load()?;
    let lexicon = config.sentiment.lexicon()?;
    info!("📋 Configuration loaded");
    info!("   - Database: {:?}", config.storage.database_path);
    info!("   - Match mode: {:?}", lexicon.mode());
    info!("   - Positive keywords: {:?}", lexicon.keywords(Sentiment::Positive));
    info!("   - Negative keywords: {:?}", lexicon.keywords(Sentiment::Negative));
    info!("   - Server: {}", config.bind_addr());

    // Schema must exist before the first request
    info!("💾 Initializing review storage...");
    let store = ReviewStore::new(&config.storage.database_path);
    store
        .ensure_schema()
        .with_context(|| format!("Failed to prepare database {:?}", store.path()))?;
    let review_count = store.count()?;
    info!("✅ Review storage ready ({} reviews)", review_count);

    let app = api::create_router(AppState::new(store, lexicon));

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET  /health                   - Health check");
    info!("   POST /reviews                  - Submit a review");
    info!("   GET  /reviews?sentiment=<...>  - List reviews");
    info!("");
    info!("✨ Server is ready to accept requests!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
