//! HTTP surface for the conversation engine

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod router;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use switchboard_catalog::Catalog;
use switchboard_config::Config;
use switchboard_provider::ProviderSet;
use switchboard_session::SessionManager;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
    sessions: SessionManager,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog overrides or escalation tables
    /// are invalid
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let catalog = Arc::new(Catalog::from_config(&config.catalog)?);
        let providers = ProviderSet::from_config(&config.providers, &catalog);
        let sessions = SessionManager::new(Arc::clone(&catalog), providers, config)?;

        let mut app = router::conversation_router(sessions.clone());

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(router::health_handler));
        }

        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
            sessions,
        })
    }

    /// Get the configured listen address
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Spawns the session reaper, then blocks until the cancellation
    /// token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let reaper = self.sessions.spawn_reaper(shutdown.clone());

        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        reaper.abort();
        Ok(())
    }
}
