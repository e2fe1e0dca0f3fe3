//! HTTP surface: router construction and the serving loop.

pub mod handlers;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::toml_config::ServerConfig;
use crate::domain::ports::{ChatCompletion, ImageTextExtractor};

pub use handlers::{AppState, HealthResponse, SimilarResponse};

/// Builds the application router. Exposed for tests that drive it directly.
pub fn router<C, E>(state: Arc<AppState<C, E>>) -> Router
where
    C: ChatCompletion + 'static,
    E: ImageTextExtractor + 'static,
{
    let upload_limit_bytes = state.upload_limit_bytes();

    Router::new()
        .route("/solve", post(handlers::solve::<C, E>))
        .route("/similar", post(handlers::similar::<C, E>))
        .route("/health", get(handlers::health_check::<C, E>))
        .layer(DefaultBodyLimit::max(upload_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct ApiServer<C: ChatCompletion, E: ImageTextExtractor> {
    config: ServerConfig,
    state: Arc<AppState<C, E>>,
}

impl<C, E> ApiServer<C, E>
where
    C: ChatCompletion + 'static,
    E: ImageTextExtractor + 'static,
{
    pub fn new(config: ServerConfig, state: AppState<C, E>) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Serves until Ctrl-C.
    pub async fn start(&self) -> Result<()> {
        let app = router(self.state.clone());

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;
        info!("math-solver API listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start API server: {}", e))?;

        info!("math-solver API stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
