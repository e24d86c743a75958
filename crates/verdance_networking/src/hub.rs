//! # Sync Hub
//!
//! The one place where viewers, the simulation and resets meet the world.
//!
//! ```text
//!  reader tasks ──apply()──┐
//!                          ▼
//!  tick loop ───tick()──► SyncHub ──► SharedWorld (RwLock<World>)
//!                          ▲
//!  broadcasters ─snapshot()┘
//! ```
//!
//! Every mutation holds the write lock for its whole duration. Resets build
//! the replacement world on a blocking thread with no lock held and only
//! take the write lock to swap it in.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use verdance_core::{SharedWorld, TileKind, TileSnapshot, World};
use verdance_ecology::{EcologySimulator, TickReport};
use verdance_procedural::{Lehmer, WorldGenerator, WorldSeed, PURPOSE_RESET};

use crate::config::ServerConfig;
use crate::error::{NetworkError, NetworkResult};
use crate::protocol::ClientMessage;

/// What a reset did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetOutcome {
    /// A fresh world replaced the old one.
    Replaced {
        /// Seed the new world was generated from.
        seed: u64,
        /// Revision of the new world.
        revision: u64,
    },
    /// Another reset was already running; this one was dropped.
    Coalesced,
}

/// What a dispatched command did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A login was recorded.
    LoggedIn,
    /// A tile changed kind.
    TileUpdated,
    /// An edit arrived without a usable `x`, `y` or `value`.
    Incomplete,
    /// An edit failed validation; nothing changed.
    Rejected(String),
    /// A reset ran or was coalesced.
    Reset(ResetOutcome),
    /// A reset was attempted and failed; the old world stays.
    ResetFailed(String),
}

/// Clears the in-flight flag when a reset finishes or is cancelled.
struct ResetGuard<'a>(&'a AtomicBool);

impl Drop for ResetGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Shared state behind every connection and the tick loop.
#[derive(Debug)]
pub struct SyncHub {
    world: SharedWorld,
    simulator: Mutex<EcologySimulator>,
    generator: WorldGenerator,
    seeds: Mutex<Lehmer>,
    width: u32,
    height: u32,
    resetting: AtomicBool,
    edits: AtomicU64,
    rejected: AtomicU64,
}

impl SyncHub {
    /// Wraps an existing world.
    ///
    /// Resets regenerate at the world's current size with seeds drawn from
    /// `seed`.
    #[must_use]
    pub fn new(
        world: World,
        generator: WorldGenerator,
        simulator: EcologySimulator,
        seed: WorldSeed,
    ) -> Self {
        let (width, height) = (world.width(), world.height());
        Self {
            world: SharedWorld::new(world),
            simulator: Mutex::new(simulator),
            generator,
            seeds: Mutex::new(seed.derive(PURPOSE_RESET).rng()),
            width,
            height,
            resetting: AtomicBool::new(false),
            edits: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Generates the initial world described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Generation`] or [`NetworkError::Config`] if
    /// the generator or ecology sections do not validate.
    pub fn from_config(config: &ServerConfig) -> NetworkResult<Self> {
        let seed = config.seed.map_or_else(WorldSeed::from_clock, WorldSeed::new);
        let generator = WorldGenerator::new(config.generator.clone())?;
        let simulator = EcologySimulator::new(config.ecology.clone(), seed)
            .map_err(|e| NetworkError::Config(e.to_string()))?;
        let world = generator.generate(seed, config.width, config.height)?;
        tracing::info!(
            seed = seed.value(),
            width = config.width,
            height = config.height,
            "initial world ready"
        );
        Ok(Self::new(world, generator, simulator, seed))
    }

    /// The shared world.
    #[inline]
    #[must_use]
    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    /// World size in tiles.
    #[inline]
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Edits accepted so far.
    #[must_use]
    pub fn accepted_edits(&self) -> u64 {
        self.edits.load(Ordering::Relaxed)
    }

    /// Edits rejected so far.
    #[must_use]
    pub fn rejected_edits(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Dispatches one decoded command from `peer`.
    pub async fn apply(&self, command: ClientMessage, peer: SocketAddr) -> CommandOutcome {
        match command {
            ClientMessage::Login { username } => {
                self.login(username.as_deref().unwrap_or(""), peer);
                CommandOutcome::LoggedIn
            }
            ClientMessage::UpdateTile {
                x: Some(x),
                y: Some(y),
                value: Some(value),
            } => match self.update_tile(x, y, value) {
                Ok(()) => CommandOutcome::TileUpdated,
                Err(err) => {
                    tracing::warn!(%peer, x, y, value, "edit rejected: {}", err);
                    CommandOutcome::Rejected(err.to_string())
                }
            },
            ClientMessage::UpdateTile { x, y, value } => {
                tracing::warn!(%peer, ?x, ?y, ?value, "updateTile without usable fields");
                CommandOutcome::Incomplete
            }
            ClientMessage::ResetTiles => {
                tracing::info!(%peer, "reset requested");
                match self.reset().await {
                    Ok(outcome) => CommandOutcome::Reset(outcome),
                    Err(err) => {
                        tracing::error!(%peer, "reset failed: {}", err);
                        CommandOutcome::ResetFailed(err.to_string())
                    }
                }
            }
        }
    }

    /// Records a login.
    pub fn login(&self, username: &str, peer: SocketAddr) {
        if username.is_empty() {
            tracing::info!(%peer, "login without a username");
        } else {
            tracing::info!(%peer, username, "login");
        }
    }

    /// Sets one tile's kind. Nutrient is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Validation`] if the coordinate lies outside
    /// the world or `value` names no tile kind. The world is untouched.
    pub fn update_tile(&self, x: i64, y: i64, value: i64) -> NetworkResult<()> {
        let result = self.world.write(|world| world.apply_edit(x, y, value));
        match result {
            Ok(previous) => {
                self.edits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(x, y, value, previous = previous.as_u8(), "tile updated");
                Ok(())
            }
            Err(err) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                Err(NetworkError::Validation(err))
            }
        }
    }

    /// Regenerates the world from a fresh seed and swaps it in.
    ///
    /// Generation runs on the blocking pool without the lock. Edits and
    /// ticks that land while it runs apply to the old world and are lost
    /// with it. A reset requested while another is running is coalesced.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Join`] if the generation task dies, or
    /// [`NetworkError::Generation`] if generation fails. The old world is
    /// kept in both cases.
    pub async fn reset(&self) -> NetworkResult<ResetOutcome> {
        if self.resetting.swap(true, Ordering::AcqRel) {
            tracing::debug!("reset already running, coalesced");
            return Ok(ResetOutcome::Coalesced);
        }
        let _guard = ResetGuard(&self.resetting);

        let seed = WorldSeed::new(self.seeds.lock().next63());
        let generator = self.generator.clone();
        let (width, height) = (self.width, self.height);

        let world = tokio::task::spawn_blocking(move || generator.generate(seed, width, height))
            .await
            .map_err(|e| NetworkError::Join(e.to_string()))??;

        self.world.swap(world);
        let revision = self.world.revision();
        tracing::info!(seed = seed.value(), revision, "world reset");
        Ok(ResetOutcome::Replaced {
            seed: seed.value(),
            revision,
        })
    }

    /// Runs one simulation step under the write lock.
    pub fn tick(&self) -> TickReport {
        let mut simulator = self.simulator.lock();
        self.world.write(|world| simulator.tick(world))
    }

    /// The current tiles, shared between callers at the same revision.
    #[must_use]
    pub fn snapshot(&self) -> Arc<TileSnapshot> {
        self.world.snapshot()
    }

    /// Kind at `(x, y)`, if inside the world.
    #[must_use]
    pub fn kind_at(&self, x: u32, y: u32) -> Option<TileKind> {
        self.snapshot()
            .kind_at(x, y)
            .and_then(TileKind::from_u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdance_ecology::EcologyParams;
    use verdance_procedural::GeneratorConfig;

    fn peer() -> SocketAddr {
        "127.0.0.1:4000".parse().unwrap()
    }

    fn hub(width: u32, height: u32) -> SyncHub {
        let seed = WorldSeed::new(11);
        let generator = WorldGenerator::new(GeneratorConfig::default()).unwrap();
        let simulator = EcologySimulator::new(EcologyParams::default(), seed).unwrap();
        SyncHub::new(World::new(width, height).unwrap(), generator, simulator, seed)
    }

    #[test]
    fn test_update_tile_accepts_and_rejects() {
        let hub = hub(10, 10);

        assert!(hub.update_tile(3, 4, 2).is_ok());
        assert_eq!(hub.kind_at(3, 4), Some(TileKind::Vegetated));
        assert_eq!(hub.world().revision(), 1);

        let before = hub.snapshot();
        assert!(matches!(
            hub.update_tile(-1, 0, 1),
            Err(NetworkError::Validation(_))
        ));
        assert!(hub.update_tile(10, 0, 1).is_err());
        assert!(hub.update_tile(0, 0, 8).is_err());
        assert_eq!(hub.snapshot(), before);

        assert_eq!(hub.accepted_edits(), 1);
        assert_eq!(hub.rejected_edits(), 3);
        assert!(hub.world().read(World::verify).is_ok());
    }

    #[test]
    fn test_tick_advances_revision() {
        let hub = hub(12, 8);
        let report = hub.tick();
        assert_eq!(report.tick, 1);
        assert_eq!(hub.world().revision(), 1);
    }

    #[tokio::test]
    async fn test_apply_dispatch() {
        let hub = hub(6, 6);

        let outcome = hub
            .apply(ClientMessage::Login { username: None }, peer())
            .await;
        assert_eq!(outcome, CommandOutcome::LoggedIn);

        let outcome = hub
            .apply(
                ClientMessage::UpdateTile {
                    x: Some(1),
                    y: Some(1),
                    value: Some(4),
                },
                peer(),
            )
            .await;
        assert_eq!(outcome, CommandOutcome::TileUpdated);
        assert_eq!(hub.kind_at(1, 1), Some(TileKind::Water));

        let outcome = hub
            .apply(
                ClientMessage::UpdateTile {
                    x: Some(1),
                    y: None,
                    value: Some(4),
                },
                peer(),
            )
            .await;
        assert_eq!(outcome, CommandOutcome::Incomplete);

        let outcome = hub
            .apply(
                ClientMessage::UpdateTile {
                    x: Some(99),
                    y: Some(1),
                    value: Some(4),
                },
                peer(),
            )
            .await;
        assert!(matches!(outcome, CommandOutcome::Rejected(_)));
    }

    #[tokio::test]
    async fn test_reset_replaces_world() {
        let hub = hub(20, 15);
        hub.update_tile(0, 0, 6).unwrap();
        let before = hub.world().revision();

        let outcome = hub.reset().await.unwrap();
        let ResetOutcome::Replaced { revision, .. } = outcome else {
            panic!("expected a replaced world, got {outcome:?}");
        };

        assert!(revision > before);
        assert_eq!(hub.world().swap_count(), 1);
        assert_eq!(hub.dimensions(), (20, 15));
        assert!(hub.world().read(World::verify).is_ok());
        assert!(!hub.resetting.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_reset_coalesces_while_running() {
        let hub = hub(8, 8);
        hub.resetting.store(true, Ordering::Release);
        assert_eq!(hub.reset().await.unwrap(), ResetOutcome::Coalesced);
        assert_eq!(hub.world().swap_count(), 0);
    }
}
