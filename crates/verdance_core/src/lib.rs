//! # VERDANCE Core
//!
//! The shared tile world every other crate reads and writes.
//!
//! ## Architecture Rules
//!
//! 1. **One aggregate** - grid, index sets and revision live in one [`World`]
//! 2. **Incremental indices** - effects iterate affected coordinates only
//! 3. **One writer at a time** - [`SharedWorld`] serializes every mutation
//!
//! ## Example
//!
//! ```rust,ignore
//! use verdance_core::{Coord, SharedWorld, TileKind, World};
//!
//! let world = World::new(240, 135)?;
//! let shared = SharedWorld::new(world);
//!
//! shared.write(|world| world.set_tile_kind(Coord::new(3, 4), TileKind::Water))?;
//! let snapshot = shared.snapshot();
//! assert_eq!(snapshot.kind_at(3, 4), Some(4));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod coord;
pub mod error;
pub mod grid;
pub mod index;
pub mod sync;
pub mod tile;
pub mod world;

pub use coord::{Coord, CoordSet};
pub use error::{CoreError, CoreResult};
pub use grid::{Grid, RING_1, RING_2};
pub use index::{EffectField, IndexSets};
pub use sync::SharedWorld;
pub use tile::{Tile, TileKind, TILE_KIND_COUNT};
pub use world::{TileSnapshot, World};
