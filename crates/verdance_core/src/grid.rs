//! # Tile Grid
//!
//! Fixed W x H array of tiles. Dimensions are set at construction and never
//! change.
//!
//! ## Neighborhoods
//!
//! ```text
//!   . 2 2 2 .        1 = RING_1 (Chebyshev distance 1)
//!   2 1 1 1 2        2 = RING_2 (distance 2, far corners excluded)
//!   2 1 X 1 2        . = excluded corner
//!   2 1 1 1 2
//!   . 2 2 2 .
//! ```
//!
//! Simulation neighborhoods clip at the edges. Generation wraps around
//! (see [`Grid::wrap`]).

use crate::coord::Coord;
use crate::error::{CoreError, CoreResult};
use crate::tile::{Tile, TileKind};

/// Offsets of the 8 cells at Chebyshev distance 1.
pub const RING_1: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Offsets of the 12 cells at Chebyshev distance 2, minus the 4 far corners.
pub const RING_2: [(i32, i32); 12] = [
    (-1, -2),
    (0, -2),
    (1, -2),
    (-2, -1),
    (2, -1),
    (-2, 0),
    (2, 0),
    (-2, 1),
    (2, 1),
    (-1, 2),
    (0, 2),
    (1, 2),
];

/// The tile array.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    /// Width in tiles.
    width: u32,
    /// Height in tiles.
    height: u32,
    /// Row-major tiles (`y * width + x`).
    tiles: Vec<Tile>,
}

impl Grid {
    /// Creates a grid filled with `fill`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u32, height: u32, fill: Tile) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            tiles: vec![fill; width as usize * height as usize],
        })
    }

    /// Width in tiles.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of tiles.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false: grids have at least one tile.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    fn index(&self, coord: Coord) -> usize {
        assert!(
            coord.x < self.width && coord.y < self.height,
            "coordinate ({}, {}) outside {}x{} grid",
            coord.x,
            coord.y,
            self.width,
            self.height
        );
        coord.y as usize * self.width as usize + coord.x as usize
    }

    /// Returns true if the signed position lies on the grid.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    /// Validates an untrusted position.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::OutOfBounds`] if the position is off the grid.
    pub fn checked_coord(&self, x: i64, y: i64) -> CoreResult<Coord> {
        if self.contains(x, y) {
            // In range for u32 after the bounds check.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Ok(Coord::new(x as u32, y as u32))
        } else {
            Err(CoreError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Tile at a coordinate.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is off the grid.
    #[inline]
    #[must_use]
    pub fn tile(&self, coord: Coord) -> &Tile {
        &self.tiles[self.index(coord)]
    }

    /// Mutable tile at a coordinate.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is off the grid.
    #[inline]
    pub fn tile_mut(&mut self, coord: Coord) -> &mut Tile {
        let index = self.index(coord);
        &mut self.tiles[index]
    }

    /// Kind at a coordinate.
    #[inline]
    #[must_use]
    pub fn kind(&self, coord: Coord) -> TileKind {
        self.tile(coord).kind
    }

    /// Overwrites the kind at a coordinate, returning the previous kind.
    ///
    /// This does not touch any index set; see [`crate::World::set_tile_kind`].
    #[inline]
    pub fn set_kind(&mut self, coord: Coord, kind: TileKind) -> TileKind {
        std::mem::replace(&mut self.tile_mut(coord).kind, kind)
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Coord::new(x, y)))
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Wraps a signed position onto the grid (toroidal topology).
    #[inline]
    #[must_use]
    pub fn wrap(&self, x: i64, y: i64) -> Coord {
        // rem_euclid keeps the result in 0..width / 0..height.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Coord::new(
            x.rem_euclid(i64::from(self.width)) as u32,
            y.rem_euclid(i64::from(self.height)) as u32,
        )
    }

    /// Offsets `coord` by `(dx, dy)`, `None` if that leaves the grid.
    #[inline]
    #[must_use]
    pub fn offset(&self, coord: Coord, dx: i32, dy: i32) -> Option<Coord> {
        let x = i64::from(coord.x) + i64::from(dx);
        let y = i64::from(coord.y) + i64::from(dy);
        self.checked_coord(x, y).ok()
    }

    /// Neighbors of `coord` at the given offsets, clipped at the edges.
    pub fn neighbors<'a>(
        &'a self,
        coord: Coord,
        offsets: &'a [(i32, i32)],
    ) -> impl Iterator<Item = Coord> + 'a {
        offsets
            .iter()
            .filter_map(move |&(dx, dy)| self.offset(coord, dx, dy))
    }

    /// Wire values in column-major order (`x * height + y`), the layout of
    /// a `tiles[x][y]` snapshot.
    #[must_use]
    pub fn kinds_column_major(&self) -> Vec<u8> {
        let mut kinds = Vec::with_capacity(self.tiles.len());
        for x in 0..self.width {
            for y in 0..self.height {
                kinds.push(self.kind(Coord::new(x, y)).as_u8());
            }
        }
        kinds
    }

    /// Number of tiles of a kind (whole-grid scan).
    #[must_use]
    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| tile.kind == kind).count()
    }
}
