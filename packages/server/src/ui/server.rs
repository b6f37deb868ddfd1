//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{config::ServerConfig, usecase::SessionHandle};

use super::{
    handler::{get_session, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

pub type ServerError = Box<dyn std::error::Error + Send + Sync>;

/// Shared session server
///
/// # Example
///
/// ```ignore
/// let (session, _task) = SessionActor::spawn(pusher, clock, config.presence);
/// Server::new(session, config).run().await?;
/// ```
pub struct Server {
    session: SessionHandle,
    config: ServerConfig,
}

impl Server {
    pub fn new(session: SessionHandle, config: ServerConfig) -> Self {
        Self { session, config }
    }

    /// Build the axum router.
    ///
    /// Paths not matched by the API fall through to the static directory.
    pub fn router(&self) -> Router {
        let app_state = Arc::new(AppState {
            session: self.session.clone(),
            keep_alive: self.config.keep_alive,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/session", get(get_session))
            .fallback_service(ServeDir::new(&self.config.static_dir))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or the server fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Session server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` completes.
    ///
    /// The session is stopped as soon as `shutdown` completes. Its teardown
    /// closes every open WebSocket, which lets the graceful shutdown finish.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let session = self.session.clone();
        let shutdown = async move {
            shutdown.await;
            if session.shutdown().is_err() {
                tracing::debug!("Session already stopped");
            }
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
