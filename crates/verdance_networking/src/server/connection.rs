//! # Viewer Connections
//!
//! Each accepted socket becomes two tasks:
//!
//! ```text
//!            ┌──────────── WebSocket ────────────┐
//!  client ◄──┤ sink   ◄── broadcaster (interval) │
//!  client ──►┤ stream ──► reader ──► hub.apply() │
//!            └───────────────────────────────────┘
//! ```
//!
//! Whichever task finishes first aborts the other.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::error::{NetworkError, NetworkResult};
use crate::hub::SyncHub;
use crate::protocol;

/// Unique identifier for a viewer connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u32);

impl ConnectionId {
    /// Invalid/null connection ID.
    pub const NULL: Self = Self(u32::MAX);

    /// Returns true if this is a null/invalid ID.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u32::MAX
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::NULL
    }
}

/// Issues connection IDs and counts live connections.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    next_id: AtomicU32,
    active: AtomicUsize,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection. It stays counted until the guard drops.
    #[must_use]
    pub fn register(self: &Arc<Self>) -> ConnectionGuard {
        let mut id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if id == u32::MAX {
            id = self.next_id.fetch_add(1, Ordering::Relaxed);
        }
        self.active.fetch_add(1, Ordering::AcqRel);
        ConnectionGuard {
            id: ConnectionId(id),
            registry: Arc::clone(self),
        }
    }

    /// Live connections.
    #[must_use]
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}

/// Keeps one connection counted in its registry.
#[derive(Debug)]
pub struct ConnectionGuard {
    id: ConnectionId,
    registry: Arc<ConnectionRegistry>,
}

impl ConnectionGuard {
    /// The connection's ID.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.active.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Per-connection timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionTiming {
    /// Snapshot period.
    pub broadcast_interval: Duration,
    /// Deadline for one snapshot send.
    pub send_timeout: Duration,
}

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsStream = SplitStream<WebSocketStream<TcpStream>>;

/// Serves one accepted socket until either side gives up.
pub(crate) async fn serve(
    stream: TcpStream,
    peer: SocketAddr,
    hub: Arc<SyncHub>,
    timing: ConnectionTiming,
    guard: ConnectionGuard,
) {
    let id = guard.id();
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(err) => {
            tracing::warn!(%peer, connection = id.0, "handshake failed: {}", err);
            return;
        }
    };
    tracing::info!("Viewer connected: {} (id: {})", peer, id.0);

    let (sink, stream) = ws.split();
    let mut broadcaster = tokio::spawn(broadcast(sink, Arc::clone(&hub), timing, id));
    let mut reader = tokio::spawn(read(stream, hub, peer, id));

    let result = tokio::select! {
        result = &mut broadcaster => {
            reader.abort();
            result
        }
        result = &mut reader => {
            broadcaster.abort();
            result
        }
    };
    match result {
        Ok(Ok(())) => {}
        Ok(Err(err)) => tracing::debug!(connection = id.0, "connection ended: {}", err),
        Err(err) => tracing::warn!(connection = id.0, "connection task failed: {}", err),
    }

    tracing::info!("Viewer disconnected: {} (id: {})", peer, id.0);
    drop(guard);
}

/// Pushes the current tiles every period until a send fails or stalls.
async fn broadcast(
    mut sink: WsSink,
    hub: Arc<SyncHub>,
    timing: ConnectionTiming,
    id: ConnectionId,
) -> NetworkResult<()> {
    let mut interval = tokio::time::interval(timing.broadcast_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let snapshot = hub.snapshot();
        let text = protocol::encode_tiles(&snapshot)?;

        match tokio::time::timeout(timing.send_timeout, sink.send(Message::Text(text))).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err.into()),
            Err(_) => {
                tracing::warn!(
                    connection = id.0,
                    revision = snapshot.revision,
                    "viewer too slow, dropping"
                );
                return Err(NetworkError::SendTimeout(timing.send_timeout));
            }
        }
    }
}

/// Applies inbound commands until the client closes or the socket fails.
async fn read(
    mut stream: WsStream,
    hub: Arc<SyncHub>,
    peer: SocketAddr,
    id: ConnectionId,
) -> NetworkResult<()> {
    while let Some(frame) = stream.next().await {
        match frame? {
            Message::Text(text) => match protocol::decode(&text) {
                Ok(command) => {
                    let kind = command.kind();
                    let outcome = hub.apply(command, peer).await;
                    tracing::trace!(connection = id.0, kind, ?outcome, "command applied");
                }
                Err(err) => {
                    tracing::warn!(connection = id.0, %peer, "discarding frame: {}", err);
                }
            },
            Message::Binary(bytes) => {
                tracing::debug!(connection = id.0, len = bytes.len(), "binary frame ignored");
            }
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_null() {
        assert!(ConnectionId::NULL.is_null());
        assert!(ConnectionId::default().is_null());
        assert!(!ConnectionId(0).is_null());
    }

    #[test]
    fn test_registry_counts_guards() {
        let registry = Arc::new(ConnectionRegistry::new());
        let a = registry.register();
        let b = registry.register();
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.active(), 2);

        drop(a);
        assert_eq!(registry.active(), 1);
        drop(b);
        assert_eq!(registry.active(), 0);
    }
}
