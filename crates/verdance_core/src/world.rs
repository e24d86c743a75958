//! # World Aggregate
//!
//! Grid, index sets and revision counter, owned together so they can only
//! change together.
//!
//! ```text
//!   World
//!   ├── grid       W x H tiles
//!   ├── index      IndexSets derived from grid
//!   └── revision   bumped by every mutation
//! ```

use crate::coord::Coord;
use crate::error::CoreResult;
use crate::grid::Grid;
use crate::index::IndexSets;
use crate::tile::{Tile, TileKind};

/// The tile world.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    index: IndexSets,
    revision: u64,
}

impl World {
    /// Creates an all-ground world with zero nutrient.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::InvalidDimensions`] if either dimension is
    /// zero.
    pub fn new(width: u32, height: u32) -> CoreResult<Self> {
        Ok(Self::from_grid(Grid::new(width, height, Tile::default())?))
    }

    /// Wraps a grid, deriving every index set with one whole-grid pass.
    #[must_use]
    pub fn from_grid(grid: Grid) -> Self {
        let index = IndexSets::from_grid(&grid);
        Self {
            grid,
            index,
            revision: 0,
        }
    }

    /// The tile grid.
    #[inline]
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The derived index sets.
    #[inline]
    #[must_use]
    pub fn index(&self) -> &IndexSets {
        &self.index
    }

    /// Grid and index sets, mutably, for the simulator.
    ///
    /// The caller is responsible for keeping the sets consistent with the
    /// grid and for calling [`World::bump_revision`].
    #[inline]
    pub fn parts_mut(&mut self) -> (&mut Grid, &mut IndexSets) {
        (&mut self.grid, &mut self.index)
    }

    /// Width in tiles.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Height in tiles.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Current revision.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Sets the revision, used when a replacement world is swapped in so
    /// revisions keep increasing.
    #[inline]
    pub fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    /// Marks the world as changed.
    #[inline]
    pub fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Sets the kind of one tile and repairs the index sets around it.
    ///
    /// The nutrient level is left untouched. Returns the previous kind.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::OutOfBounds`] if `coord` is off the grid.
    pub fn set_tile_kind(&mut self, coord: Coord, kind: TileKind) -> CoreResult<TileKind> {
        let coord = self
            .grid
            .checked_coord(i64::from(coord.x), i64::from(coord.y))?;
        let previous = self.grid.set_kind(coord, kind);
        self.index.reconcile(&self.grid, coord, previous);
        self.bump_revision();
        Ok(previous)
    }

    /// Applies an untrusted edit: signed position and raw kind value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::OutOfBounds`] or
    /// [`crate::CoreError::InvalidKind`]; the world is unchanged on error.
    pub fn apply_edit(&mut self, x: i64, y: i64, value: i64) -> CoreResult<TileKind> {
        let coord = self.grid.checked_coord(x, y)?;
        let kind = TileKind::from_raw(value)?;
        self.set_tile_kind(coord, kind)
    }

    /// Checks the index sets against the grid.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::IndexDrift`] on the first mismatch.
    pub fn verify(&self) -> CoreResult<()> {
        self.index.verify(&self.grid)
    }

    /// Copies the tile kinds into an immutable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            revision: self.revision,
            width: self.grid.width(),
            height: self.grid.height(),
            kinds: self.grid.kinds_column_major(),
        }
    }
}

/// Immutable copy of every tile kind at one revision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileSnapshot {
    /// Revision the snapshot was taken at.
    pub revision: u64,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Wire values, column-major (`x * height + y`).
    pub kinds: Vec<u8>,
}

impl TileSnapshot {
    /// Kind at a position, `None` off the grid.
    #[must_use]
    pub fn kind_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.kinds
            .get(x as usize * self.height as usize + y as usize)
            .copied()
    }

    /// One column (`tiles[x]`).
    #[must_use]
    pub fn column(&self, x: u32) -> Option<&[u8]> {
        if x >= self.width {
            return None;
        }
        let height = self.height as usize;
        let start = x as usize * height;
        self.kinds.get(start..start + height)
    }

    /// Iterates over the columns in x order.
    pub fn columns(&self) -> impl Iterator<Item = &[u8]> {
        self.kinds.chunks(self.height as usize)
    }

    /// Number of tiles of a kind.
    #[must_use]
    pub fn count(&self, kind: TileKind) -> usize {
        self.kinds.iter().filter(|&&k| k == kind.as_u8()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_new_world_is_ground() {
        let world = World::new(6, 4).unwrap();
        assert_eq!(world.width(), 6);
        assert_eq!(world.height(), 4);
        assert_eq!(world.revision(), 0);
        assert_eq!(world.grid().count_kind(TileKind::Ground), 24);
        assert!(world.index().vegetated.is_empty());
    }

    #[test]
    fn test_set_tile_kind_reconciles_and_bumps() {
        let mut world = World::new(10, 10).unwrap();
        let previous = world
            .set_tile_kind(Coord::new(0, 0), TileKind::Water)
            .unwrap();

        assert_eq!(previous, TileKind::Ground);
        assert_eq!(world.revision(), 1);
        assert!(world.index().water.ring1.contains(Coord::new(1, 1)));
        assert!(world.index().water.ring2.contains(Coord::new(2, 1)));
        assert_eq!(world.verify(), Ok(()));
    }

    #[test]
    fn test_edit_keeps_nutrient() {
        let mut world = World::new(3, 3).unwrap();
        world.parts_mut().0.tile_mut(Coord::new(1, 1)).nutrient = 0.6;
        world.apply_edit(1, 1, 2).unwrap();

        let tile = world.grid().tile(Coord::new(1, 1));
        assert_eq!(tile.kind, TileKind::Vegetated);
        assert!((tile.nutrient - 0.6).abs() < f64::EPSILON);
        assert_eq!(world.index().frontier.len(), 8);
    }

    #[test]
    fn test_rejected_edits_leave_world_unchanged() {
        let mut world = World::new(10, 10).unwrap();
        let before = world.snapshot();

        assert!(matches!(
            world.apply_edit(-1, 0, 1),
            Err(CoreError::OutOfBounds { x: -1, y: 0, .. })
        ));
        assert!(world.apply_edit(0, 10, 1).is_err());
        assert_eq!(world.apply_edit(0, 0, 8), Err(CoreError::InvalidKind(8)));

        assert_eq!(world.snapshot(), before);
    }

    #[test]
    fn test_snapshot_is_column_major() {
        let mut world = World::new(4, 3).unwrap();
        world.set_tile_kind(Coord::new(3, 1), TileKind::Lowlands).unwrap();
        let snapshot = world.snapshot();

        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.columns().count(), 4);
        assert_eq!(snapshot.column(3), Some(&[0, 7, 0][..]));
        assert_eq!(snapshot.kind_at(3, 1), Some(7));
        assert_eq!(snapshot.kind_at(4, 0), None);
        assert_eq!(snapshot.count(TileKind::Lowlands), 1);
    }
}
