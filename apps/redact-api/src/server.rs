//! HTTP server wiring
//!
//! A [`Server`] is built from a [`ServerConfig`] and owns the shared
//! [`Pipeline`]; nothing is registered globally.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use redact_core::{LopdfEngine, PdfEngine, Pipeline, TempStore, WatermarkConfig};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handlers;

pub const DEFAULT_ROUTE: &str = "/api/v1/candidate-resume-pdf";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path of the redaction endpoint
    pub route: String,
    pub watermark: WatermarkConfig,
    /// Directory for intermediate files; the system temp dir when unset
    pub temp_dir: Option<PathBuf>,
    /// Request body limit in bytes; unlimited when unset
    pub max_body_bytes: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            route: DEFAULT_ROUTE.to_string(),
            watermark: WatermarkConfig::default(),
            temp_dir: None,
            max_body_bytes: None,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_engine(config, Arc::new(LopdfEngine::new()))
    }

    /// Build a server around a specific engine implementation.
    pub fn with_engine(config: ServerConfig, engine: Arc<dyn PdfEngine>) -> Self {
        let store = config
            .temp_dir
            .clone()
            .map(TempStore::new)
            .unwrap_or_default();
        let pipeline = Pipeline::new(engine, store, config.watermark.clone());

        Self {
            config,
            state: AppState {
                pipeline: Arc::new(pipeline),
            },
        }
    }

    pub fn router(&self) -> Router {
        // CORS configuration for web clients
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let body_limit = match self.config.max_body_bytes {
            Some(limit) => DefaultBodyLimit::max(limit),
            None => DefaultBodyLimit::disable(),
        };

        Router::new()
            // Health check
            .route("/health", get(handlers::health))
            // Redaction endpoint
            .route(&self.config.route, post(handlers::candidate_resume_pdf))
            // Add middleware
            .layer(body_limit)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// Bind and serve until Ctrl-C or SIGTERM.
    pub async fn run(self) -> anyhow::Result<()> {
        let image = &self.config.watermark.image_path;
        if !image.is_file() {
            warn!(
                "Watermark image {} not found; requests will fail until it exists",
                image.display()
            );
        }

        let addr = self.config.addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        info!(
            "Serving POST {} on http://{}",
            self.config.route,
            listener.local_addr()?
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
