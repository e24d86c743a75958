//! # Server Edge
//!
//! TCP accept loop, WebSocket handshake, and the simulation task.
//!
//! ```text
//! VerdanceServer::run()
//!   └── accept ──► spawn(serve) ──► broadcaster + reader
//! spawn_simulation()
//!   └── TickLoop ──► hub.tick() every period
//! ```

mod connection;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionRegistry, ConnectionTiming};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::error::NetworkResult;
use crate::hub::SyncHub;
use crate::tick::TickLoop;

/// The WebSocket server.
#[derive(Debug)]
pub struct VerdanceServer {
    listener: TcpListener,
    hub: Arc<SyncHub>,
    timing: ConnectionTiming,
    registry: Arc<ConnectionRegistry>,
}

impl VerdanceServer {
    /// Binds the listener from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::NetworkError::Io`] if the address cannot be bound.
    pub async fn bind(config: &ServerConfig, hub: Arc<SyncHub>) -> NetworkResult<Self> {
        let listener = TcpListener::bind(config.bind_address.as_str()).await?;
        tracing::info!(address = %listener.local_addr()?, "listening");
        Ok(Self {
            listener,
            hub,
            timing: ConnectionTiming {
                broadcast_interval: config.broadcast_interval(),
                send_timeout: config.send_timeout(),
            },
            registry: Arc::new(ConnectionRegistry::new()),
        })
    }

    /// Address actually bound (useful with port 0).
    ///
    /// # Errors
    ///
    /// Returns [`crate::NetworkError::Io`] if the socket has no address.
    pub fn local_addr(&self) -> NetworkResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// The hub every connection talks to.
    #[must_use]
    pub fn hub(&self) -> &Arc<SyncHub> {
        &self.hub
    }

    /// Live connection counter.
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Accepts connections forever. Accept failures are logged and skipped.
    pub async fn run(self) {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    tracing::warn!("accept failed: {}", err);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    continue;
                }
            };
            if let Err(err) = stream.set_nodelay(true) {
                tracing::debug!(%peer, "set_nodelay failed: {}", err);
            }
            let guard = self.registry.register();
            tracing::debug!(%peer, active = self.registry.active(), "accepted");
            tokio::spawn(connection::serve(
                stream,
                peer,
                Arc::clone(&self.hub),
                self.timing,
                guard,
            ));
        }
    }
}

/// Starts the single simulation task.
#[must_use]
pub fn spawn_simulation(hub: Arc<SyncHub>, config: &ServerConfig) -> JoinHandle<()> {
    let mut tick_loop = TickLoop::new(config.tick_interval()).with_stats_every(config.stats_every);
    let period_ms = config.tick_interval_ms;
    tokio::spawn(async move {
        tracing::info!(period_ms, "simulation started");
        tick_loop.run(None, || hub.tick()).await;
    })
}
