//! # Neighbor-Index Sets
//!
//! Derived coordinate sets that let the simulator touch only affected cells.
//!
//! ## Sets
//!
//! ```text
//! vegetated            every Vegetated tile
//! frontier             Ground tiles touching at least one Vegetated tile
//! water.{sources,ring1,ring2}
//! inorganic.{sources,ring1,ring2}
//! contamination.{sources,ring1}
//! ```
//!
//! Rings are unions over all sources of a category. Every category goes
//! through the same [`EffectField`] routine; only its reach differs.
//!
//! ## Maintenance
//!
//! - [`IndexSets::rebuild`]: one whole-grid pass, after generation
//! - [`IndexSets::reconcile`]: local repair after a single tile changes kind
//! - [`IndexSets::refresh_frontier_around`]: local frontier repair

use crate::coord::{Coord, CoordSet};
use crate::error::{CoreError, CoreResult};
use crate::grid::{Grid, RING_1, RING_2};
use crate::tile::TileKind;

/// Sources of one effect category plus the rings they reach.
#[derive(Clone, Debug)]
pub struct EffectField {
    /// Tiles emitting the effect.
    pub sources: CoordSet,
    /// Cells at Chebyshev distance 1 of any source.
    pub ring1: CoordSet,
    /// Cells in [`RING_2`] of any source. Stays empty when the field has
    /// no second ring.
    pub ring2: CoordSet,
    /// Whether the effect reaches the second ring.
    reaches_ring2: bool,
    /// Which kinds emit this effect.
    is_source: fn(TileKind) -> bool,
}

impl EffectField {
    /// Creates an empty field.
    #[must_use]
    pub fn new(width: u32, height: u32, reaches_ring2: bool, is_source: fn(TileKind) -> bool) -> Self {
        Self {
            sources: CoordSet::new(width, height),
            ring1: CoordSet::new(width, height),
            ring2: CoordSet::new(width, height),
            reaches_ring2,
            is_source,
        }
    }

    /// Returns whether a kind emits this effect.
    #[inline]
    #[must_use]
    pub fn emits(&self, kind: TileKind) -> bool {
        (self.is_source)(kind)
    }

    /// Registers a source and propagates it to its rings.
    pub fn add_source(&mut self, grid: &Grid, coord: Coord) {
        if !self.sources.insert(coord) {
            return;
        }
        for cell in grid.neighbors(coord, &RING_1) {
            self.ring1.insert(cell);
        }
        if self.reaches_ring2 {
            for cell in grid.neighbors(coord, &RING_2) {
                self.ring2.insert(cell);
            }
        }
    }

    /// Unregisters a source and re-derives the rings it used to reach.
    ///
    /// A cell stays in a ring while any other source still reaches it.
    pub fn remove_source(&mut self, grid: &Grid, coord: Coord) {
        if !self.sources.remove(coord) {
            return;
        }
        for cell in grid.neighbors(coord, &RING_1) {
            let covered = grid
                .neighbors(cell, &RING_1)
                .any(|source| self.sources.contains(source));
            self.ring1.set(cell, covered);
        }
        if self.reaches_ring2 {
            for cell in grid.neighbors(coord, &RING_2) {
                let covered = grid
                    .neighbors(cell, &RING_2)
                    .any(|source| self.sources.contains(source));
                self.ring2.set(cell, covered);
            }
        }
    }

    /// Applies a kind change at `coord` to this field.
    pub fn on_kind_change(&mut self, grid: &Grid, coord: Coord, previous: TileKind, current: TileKind) {
        match (self.emits(previous), self.emits(current)) {
            (true, false) => self.remove_source(grid, coord),
            (false, true) => self.add_source(grid, coord),
            _ => {}
        }
    }

    /// Clears and repopulates from the grid (whole-grid pass).
    pub fn rebuild(&mut self, grid: &Grid) {
        self.sources.clear();
        self.ring1.clear();
        self.ring2.clear();
        for coord in grid.coords() {
            if self.emits(grid.kind(coord)) {
                self.add_source(grid, coord);
            }
        }
    }
}

impl PartialEq for EffectField {
    fn eq(&self, other: &Self) -> bool {
        self.reaches_ring2 == other.reaches_ring2
            && self.sources == other.sources
            && self.ring1 == other.ring1
            && self.ring2 == other.ring2
    }
}

impl Eq for EffectField {}

/// Every derived set the simulator relies on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexSets {
    /// Tiles of kind `Vegetated`.
    pub vegetated: CoordSet,
    /// Ground tiles eligible for growth.
    pub frontier: CoordSet,
    /// Water and its irrigation rings.
    pub water: EffectField,
    /// Rock and its sterilization rings.
    pub inorganic: EffectField,
    /// Contamination sources and their first ring.
    pub contamination: EffectField,
}

impl IndexSets {
    /// Creates empty sets for a `width` x `height` grid.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            vegetated: CoordSet::new(width, height),
            frontier: CoordSet::new(width, height),
            water: EffectField::new(width, height, true, TileKind::is_water),
            inorganic: EffectField::new(width, height, true, TileKind::is_inorganic),
            contamination: EffectField::new(width, height, false, TileKind::is_contamination),
        }
    }

    /// Builds all sets from scratch for a grid.
    #[must_use]
    pub fn from_grid(grid: &Grid) -> Self {
        let mut sets = Self::new(grid.width(), grid.height());
        sets.rebuild(grid);
        sets
    }

    /// Repopulates every set from the grid.
    pub fn rebuild(&mut self, grid: &Grid) {
        self.vegetated.clear();
        self.frontier.clear();
        for coord in grid.coords() {
            if grid.kind(coord) == TileKind::Vegetated {
                self.vegetated.insert(coord);
            }
        }
        for coord in grid.coords() {
            if is_frontier(grid, coord) {
                self.frontier.insert(coord);
            }
        }
        self.water.rebuild(grid);
        self.inorganic.rebuild(grid);
        self.contamination.rebuild(grid);
    }

    /// Re-derives frontier membership for `coord` and its 8 neighbors.
    ///
    /// A cell is on the frontier iff it is ground and touches vegetation.
    pub fn refresh_frontier_around(&mut self, grid: &Grid, coord: Coord) {
        self.frontier.set(coord, is_frontier(grid, coord));
        for cell in grid.neighbors(coord, &RING_1) {
            self.frontier.set(cell, is_frontier(grid, cell));
        }
    }

    /// Repairs every set after the tile at `coord` changed from `previous`
    /// to its current kind.
    pub fn reconcile(&mut self, grid: &Grid, coord: Coord, previous: TileKind) {
        let current = grid.kind(coord);
        if previous == current {
            return;
        }
        self.vegetated.set(coord, current == TileKind::Vegetated);
        self.water.on_kind_change(grid, coord, previous, current);
        self.inorganic.on_kind_change(grid, coord, previous, current);
        self.contamination.on_kind_change(grid, coord, previous, current);
        self.refresh_frontier_around(grid, coord);
    }

    /// Checks every set against a fresh rebuild of the grid.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexDrift`] naming the first set that disagrees.
    pub fn verify(&self, grid: &Grid) -> CoreResult<()> {
        let fresh = Self::from_grid(grid);
        let pairs: [(&'static str, &CoordSet, &CoordSet); 10] = [
            ("vegetated", &self.vegetated, &fresh.vegetated),
            ("frontier", &self.frontier, &fresh.frontier),
            ("water", &self.water.sources, &fresh.water.sources),
            ("water_ring1", &self.water.ring1, &fresh.water.ring1),
            ("water_ring2", &self.water.ring2, &fresh.water.ring2),
            ("inorganic", &self.inorganic.sources, &fresh.inorganic.sources),
            ("inorganic_ring1", &self.inorganic.ring1, &fresh.inorganic.ring1),
            ("inorganic_ring2", &self.inorganic.ring2, &fresh.inorganic.ring2),
            ("contamination", &self.contamination.sources, &fresh.contamination.sources),
            ("contamination_ring1", &self.contamination.ring1, &fresh.contamination.ring1),
        ];
        for (set, actual, expected) in pairs {
            if let Some(coord) = first_difference(actual, expected) {
                return Err(CoreError::IndexDrift {
                    set,
                    x: coord.x,
                    y: coord.y,
                });
            }
        }
        Ok(())
    }
}

/// Ground that touches vegetation.
#[inline]
fn is_frontier(grid: &Grid, coord: Coord) -> bool {
    grid.kind(coord) == TileKind::Ground
        && grid
            .neighbors(coord, &RING_1)
            .any(|cell| grid.kind(cell) == TileKind::Vegetated)
}

fn first_difference(actual: &CoordSet, expected: &CoordSet) -> Option<Coord> {
    actual
        .iter()
        .find(|&coord| !expected.contains(coord))
        .or_else(|| expected.iter().find(|&coord| !actual.contains(coord)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Tile;

    fn grid(width: u32, height: u32) -> Grid {
        Grid::new(width, height, Tile::new(TileKind::Ground, 0.09)).unwrap()
    }

    fn paint(grid: &mut Grid, sets: &mut IndexSets, coord: Coord, kind: TileKind) {
        let previous = grid.set_kind(coord, kind);
        sets.reconcile(grid, coord, previous);
    }

    #[test]
    fn test_water_rings_exclude_far_corners() {
        let mut g = grid(10, 10);
        g.set_kind(Coord::new(5, 5), TileKind::Water);
        let sets = IndexSets::from_grid(&g);

        assert_eq!(sets.water.sources.len(), 1);
        assert_eq!(sets.water.ring1.len(), 8);
        assert_eq!(sets.water.ring2.len(), 12);
        assert!(sets.water.ring1.contains(Coord::new(6, 6)));
        assert!(!sets.water.ring1.contains(Coord::new(5, 5)));
        assert!(sets.water.ring2.contains(Coord::new(7, 6)));
        assert!(!sets.water.ring2.contains(Coord::new(7, 7)));
        assert!(!sets.water.ring2.contains(Coord::new(6, 6)));
    }

    #[test]
    fn test_contamination_has_no_second_ring() {
        let mut g = grid(10, 10);
        g.set_kind(Coord::new(5, 5), TileKind::Contamination);
        let sets = IndexSets::from_grid(&g);

        assert_eq!(sets.contamination.ring1.len(), 8);
        assert!(sets.contamination.ring2.is_empty());
    }

    #[test]
    fn test_frontier_is_ground_touching_vegetation() {
        let mut g = grid(5, 5);
        g.set_kind(Coord::new(2, 2), TileKind::Vegetated);
        g.set_kind(Coord::new(1, 1), TileKind::Mountain);
        let sets = IndexSets::from_grid(&g);

        assert!(sets.vegetated.contains(Coord::new(2, 2)));
        assert_eq!(sets.frontier.len(), 7);
        assert!(!sets.frontier.contains(Coord::new(1, 1)));
        assert!(!sets.frontier.contains(Coord::new(2, 2)));
        assert!(!sets.frontier.contains(Coord::new(0, 0)));
    }

    #[test]
    fn test_removing_one_of_two_sources_keeps_shared_ring() {
        let mut g = grid(10, 10);
        let mut sets = IndexSets::from_grid(&g);
        paint(&mut g, &mut sets, Coord::new(4, 4), TileKind::Water);
        paint(&mut g, &mut sets, Coord::new(6, 4), TileKind::Water);

        paint(&mut g, &mut sets, Coord::new(4, 4), TileKind::Ground);

        // (5, 4) is still next to the remaining source at (6, 4).
        assert!(sets.water.ring1.contains(Coord::new(5, 4)));
        // (3, 4) was only reached by the removed source.
        assert!(!sets.water.ring1.contains(Coord::new(3, 4)));
        assert_eq!(sets.verify(&g), Ok(()));
    }

    #[test]
    fn test_reconcile_matches_rebuild() {
        let mut g = grid(12, 9);
        let mut sets = IndexSets::from_grid(&g);
        let edits = [
            (Coord::new(0, 0), TileKind::Water),
            (Coord::new(3, 3), TileKind::Vegetated),
            (Coord::new(4, 3), TileKind::Vegetated),
            (Coord::new(8, 2), TileKind::Mountain),
            (Coord::new(9, 2), TileKind::HighMountain),
            (Coord::new(11, 8), TileKind::Contamination),
            (Coord::new(3, 3), TileKind::Ground),
            (Coord::new(8, 2), TileKind::Lowlands),
            (Coord::new(4, 3), TileKind::Water),
        ];
        for (coord, kind) in edits {
            paint(&mut g, &mut sets, coord, kind);
            assert_eq!(sets.verify(&g), Ok(()), "after painting {coord:?} {kind:?}");
        }
    }

    #[test]
    fn test_verify_reports_drift() {
        let mut g = grid(4, 4);
        let sets = IndexSets::from_grid(&g);
        g.set_kind(Coord::new(1, 2), TileKind::Vegetated);

        assert_eq!(
            sets.verify(&g),
            Err(CoreError::IndexDrift {
                set: "vegetated",
                x: 1,
                y: 2
            })
        );
    }
}
