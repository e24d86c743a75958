//! # Shared World
//!
//! ```text
//!                 ┌────────────────────────────────┐
//!                 │          SharedWorld           │
//!                 │                                │
//!                 │  ┌──────────────────────────┐  │
//!                 │  │     RwLock<World>        │  │
//!                 │  └──────────────────────────┘  │
//!                 │  ┌──────────────────────────┐  │
//!                 │  │ Mutex<Arc<TileSnapshot>> │  │
//!                 │  │  (keyed by revision)     │  │
//!                 │  └──────────────────────────┘  │
//!                 └────────────────────────────────┘
//!                           │
//!           ┌───────────────┼───────────────┐
//!           ▼               ▼               ▼
//!     ┌──────────┐   ┌────────────┐   ┌──────────┐
//!     │  write   │   │  snapshot  │   │   swap   │
//!     │tick/edit │   │ broadcast  │   │  reset   │
//!     └──────────┘   └────────────┘   └──────────┘
//! ```
//!
//! ## Lock Order
//!
//! World lock first, snapshot cache second. The cache lock is only taken
//! while the world read lock is held, so a cached snapshot always matches
//! the revision it is stored under.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::world::{TileSnapshot, World};

/// The world behind a single-writer lock, with a snapshot cache.
///
/// ## Usage
///
/// ```rust,ignore
/// let shared = SharedWorld::new(World::new(240, 135)?);
///
/// // Simulation task
/// shared.write(|world| simulator.tick(world));
///
/// // Broadcaster tasks (many)
/// let snapshot = shared.snapshot();
/// ```
#[derive(Debug)]
pub struct SharedWorld {
    /// The world. Every mutation takes the write side.
    world: RwLock<World>,
    /// Last snapshot built, reused while the revision is unchanged.
    cache: Mutex<Option<Arc<TileSnapshot>>>,
    /// Number of whole-world swaps performed.
    swaps: AtomicU64,
}

impl SharedWorld {
    /// Wraps a world.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            world: RwLock::new(world),
            cache: Mutex::new(None),
            swaps: AtomicU64::new(0),
        }
    }

    /// Runs `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&World) -> R) -> R {
        f(&self.world.read())
    }

    /// Runs `f` with exclusive access.
    ///
    /// `f` must bump the revision if it changes anything visible in a
    /// snapshot; [`World`]'s own mutators already do.
    pub fn write<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.world.write())
    }

    /// Current revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.world.read().revision()
    }

    /// Number of whole-world swaps performed so far.
    #[inline]
    #[must_use]
    pub fn swap_count(&self) -> u64 {
        self.swaps.load(Ordering::Relaxed)
    }

    /// Snapshot of the current state.
    ///
    /// Taken under the read lock, so it always reflects exactly one revision.
    /// Rebuilt at most once per revision; callers at the same revision share
    /// one allocation.
    #[must_use]
    pub fn snapshot(&self) -> Arc<TileSnapshot> {
        let world = self.world.read();
        let mut cache = self.cache.lock();
        if let Some(cached) = cache.as_ref() {
            if cached.revision == world.revision() {
                return Arc::clone(cached);
            }
        }
        let fresh = Arc::new(world.snapshot());
        *cache = Some(Arc::clone(&fresh));
        fresh
    }

    /// Replaces the whole world in one step and returns the old one.
    ///
    /// The replacement continues the revision sequence, so snapshots taken
    /// before the swap are never mistaken for current ones.
    pub fn swap(&self, mut replacement: World) -> World {
        let mut world = self.world.write();
        replacement.set_revision(world.revision().wrapping_add(1));
        let previous = std::mem::replace(&mut *world, replacement);
        *self.cache.lock() = None;
        self.swaps.fetch_add(1, Ordering::Relaxed);
        previous
    }
}
