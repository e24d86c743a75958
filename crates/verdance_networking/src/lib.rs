//! # VERDANCE Networking - Live Sync
//!
//! Serves one shared tile world to any number of WebSocket viewers.
//!
//! ## Architecture
//!
//! - **Protocol**: tagged JSON text frames, validated at the boundary
//! - **Hub**: edits, resets, ticks and snapshots behind one lock
//! - **Server**: a reader and a broadcaster task per viewer
//! - **Tick loop**: one fixed-period simulation task
//!
//! ## Data Flow
//!
//! ```text
//! VIEWER                            SERVER
//!   |                                 |
//!   |--- updateTile {x, y, value} --->| <- bounds + kind checked
//!   |                                 |    write lock, reconcile index
//!   |<-- tiles [[...]] (every 125ms) -| <- read lock snapshot,
//!   |                                 |    encoded outside the lock
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use verdance_networking::{spawn_simulation, ServerConfig, SyncHub, VerdanceServer};
//!
//! let config = ServerConfig::default();
//! let hub = Arc::new(SyncHub::from_config(&config)?);
//! let _simulation = spawn_simulation(Arc::clone(&hub), &config);
//! VerdanceServer::bind(&config, hub).await?.run().await;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod hub;
pub mod protocol;
pub mod server;
pub mod tick;

pub use config::{CliArgs, ServerConfig, DEFAULT_BIND_ADDRESS};
pub use error::{NetworkError, NetworkResult};
pub use hub::{CommandOutcome, ResetOutcome, SyncHub};
pub use protocol::{ClientMessage, ServerMessage};
pub use server::{spawn_simulation, ConnectionId, ConnectionRegistry, VerdanceServer};
pub use tick::{TickLoop, TickStats};
