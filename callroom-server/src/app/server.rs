use crate::app::{AppState, build_router};
use crate::config::ServerConfig;
use crate::history::HistoryStore;
use crate::room::Coordinator;
use crate::signaling::{Gateway, SignalingOutput};
use anyhow::{Context, Result};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// A bound, not yet running, signaling server.
pub struct Server {
    listener: TcpListener,
    router: Router,
    state: Arc<AppState>,
}

impl Server {
    /// Wire gateway, coordinator and history together and bind the listener.
    /// Must be called inside a Tokio runtime: the coordinator task starts here.
    pub async fn bind(config: ServerConfig, history: Arc<dyn HistoryStore>) -> Result<Self> {
        let gateway = Gateway::new(config.ice_servers.clone());
        let output: Arc<dyn SignalingOutput> = Arc::new(gateway.clone());
        let coordinator = Coordinator::spawn(output, history.clone(), config.command_queue);

        let state = Arc::new(AppState {
            gateway,
            coordinator,
            history,
        });
        let router = build_router(state.clone(), config.cors_origin.as_deref())?;

        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

        Ok(Self {
            listener,
            router,
            state,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Listener has no local address")
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Signaling server listening on http://{}", self.local_addr()?);

        let state = self.state.clone();
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Server terminated with an error")?;

        info!(
            "Signaling server stopped with {} open connection(s)",
            state.gateway.connection_count()
        );
        Ok(())
    }
}
