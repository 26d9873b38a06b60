use std::sync::Arc;

use crate::config::Config;
use crate::matching::engine::Engine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only after startup; handlers reach it through `spawn_blocking`.
    pub engine: Arc<Engine>,
    pub config: Config,
}
