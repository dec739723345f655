//! Demo HTTP server.
//!
//! # Responsibilities
//! - Create the Axum router with the demo handlers
//! - Wire up middleware (request timeout, access capture)
//! - Raise [`ServerStarted`] once the listener is bound
//! - Stop on Ctrl+C and flush the logger before returning

use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;

use crate::config::AppConfig;
use crate::http::capture;
use crate::lifecycle::ServerStarted;
use crate::router::Logger;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub logger: Logger,
}

/// HTTP server exercising the logger.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    logger: Logger,
}

impl HttpServer {
    pub fn new(config: AppConfig, logger: Logger) -> Self {
        let state = AppState {
            logger: logger.clone(),
        };
        let router = Self::build_router(&config, state, &logger);
        Self { router, config, logger }
    }

    /// Capture wraps the timeout so timed-out requests are still logged.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState, logger: &Logger) -> Router {
        let router = Router::new()
            .route("/", get(hello))
            .route("/health", get(health))
            .fallback(not_found)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));
        capture::install(router, logger)
    }

    /// The assembled router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, started: &ServerStarted) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        self.logger
            .category("app")
            .info_with("server listening on", [addr.to_string()]);
        started.notify();

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.logger.flush().await;
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

async fn hello(State(state): State<AppState>) -> &'static str {
    state.logger.category("app").debug("hello requested");
    "hello"
}

async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
