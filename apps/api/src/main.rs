mod assessment;
mod catalog;
mod config;
mod embedding;
mod errors;
mod matching;
mod resume;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::{loader::load_from_dir, Catalog};
use crate::config::{Config, EmbeddingBackend};
use crate::embedding::cache::EmbeddingCache;
use crate::embedding::{EmbeddingProvider, FastEmbedProvider, HashingEmbedder, RemoteEmbedder};
use crate::matching::engine::Engine;
use crate::matching::trends::KeywordTrendAnalyzer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing remote-backend settings)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PathFinder+ API v{}", env!("CARGO_PKG_VERSION"));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // The remote encoder and the catalog build are blocking
    let engine = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || build_engine(&config))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking failed during startup: {e}"))??
    };

    let state = AppState {
        engine: Arc::new(engine),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    info!("Listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Encoder, catalog tables and corpus embeddings. Any failure here is fatal.
fn build_engine(config: &Config) -> Result<Engine> {
    let embedder: Arc<dyn EmbeddingProvider> = match &config.embedding_backend {
        EmbeddingBackend::FastEmbed => Arc::new(FastEmbedProvider::load(&config.models_dir.join("fastembed"))?),
        EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new(config.embedding_dimensions)?),
        EmbeddingBackend::Remote {
            api_url,
            api_key,
            model,
        } => Arc::new(RemoteEmbedder::connect(
            api_url,
            api_key.clone(),
            model.clone(),
            config.embedding_dimensions,
        )?),
    };
    info!(
        "Embedding provider ready (model: {}, {} dims)",
        embedder.model_id(),
        embedder.dimensions()
    );

    // An empty MODELS_DIR turns the on-disk cache off
    let cache = if config.models_dir.as_os_str().is_empty() {
        EmbeddingCache::disabled()
    } else {
        EmbeddingCache::new(&config.models_dir, config.force_refresh)
    };
    let tables = load_from_dir(&config.data_dir);
    let catalog = Catalog::build(tables, embedder.as_ref(), &cache)?;
    info!(
        "Catalog loaded from {}: {} occupations, {} jobs, {} courses, {} academic programmes",
        config.data_dir.display(),
        catalog.taxonomy.occupation_count(),
        catalog.jobs.len(),
        catalog.courses.len(),
        catalog.academic.len()
    );

    Ok(Engine::new(catalog, embedder, Box::new(KeywordTrendAnalyzer)))
}
