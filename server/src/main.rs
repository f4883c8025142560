use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use mammogram_gateway::config::{Config, RunMode};
use mammogram_gateway::segmentation::HttpSegmentationService;
use mammogram_gateway::server::{AppState, build_router};
use mammogram_gateway::store::{DocumentStore, InMemoryDocumentStore, MongoDocumentStore};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn default_log_filter(mode: RunMode) -> &'static str {
    match mode {
        RunMode::Production => "mammogram_gateway=info,tower_http=info",
        RunMode::Development => "mammogram_gateway=debug,tower_http=debug",
    }
}

/// Pick the document store: MongoDB when a URI is configured, memory otherwise (development only)
async fn init_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store.uri {
        Some(ref uri) => {
            let store = MongoDocumentStore::connect(uri, &config.store)
                .await
                .context("Failed to initialize MongoDB store")?;
            if let Err(e) = store.ping().await {
                warn!("MongoDB not reachable at startup, continuing: {}", e);
            }
            Ok(Arc::new(store))
        }
        None if config.mode.is_production() => {
            anyhow::bail!("MONGO_URI must be set in production mode")
        }
        None => {
            warn!("MONGO_URI not set - using in-memory store, data is lost on restart");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_log_filter(config.mode).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize Prometheus metrics recorder (must be done before any metrics are recorded)
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!(
        "Loaded configuration: host={}, port={}, mode={:?}",
        config.host, config.port, config.mode
    );
    info!(
        "Segmentation service: {} (timeout {:?}, history {})",
        config.segmentation.api_url,
        config.segmentation.timeout,
        if config.segmentation.history_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    let store = init_store(&config).await?;
    let segmentation_service = HttpSegmentationService::new(&config.segmentation)
        .context("Failed to build segmentation client")?;

    let app_state = AppState::new(Arc::new(segmentation_service), store)
        .with_history(config.segmentation.history_enabled)
        .with_metrics(prometheus_handle);

    let app = build_router(app_state, config.max_body_size);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Mammogram gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
