//! # Terrain Rules
//!
//! The two tables that shape generated terrain:
//!
//! - [`TileDistribution`]: how often each kind is drawn when seeding
//! - [`AdjacencyCosts`]: how much a kind dislikes (or likes) each neighbor
//!
//! ## Conflict Score
//!
//! ```text
//!   conflict(x, y, r) = sum over the (2r+1)^2 window around (x, y),
//!                       center included, edges wrapping:
//!                         cost[kind(x, y)][kind(nx, ny)]
//! ```
//!
//! Zero or below means the cell is content with its surroundings.

use serde::{Deserialize, Serialize};
use verdance_core::{Coord, Grid, TileKind, TILE_KIND_COUNT};

use crate::seed::Lehmer;

/// Categorical weights for drawing a kind, in wire order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileDistribution {
    weights: [u32; TILE_KIND_COUNT],
}

impl TileDistribution {
    /// Creates a distribution from raw weights.
    #[inline]
    #[must_use]
    pub const fn new(weights: [u32; TILE_KIND_COUNT]) -> Self {
        Self { weights }
    }

    /// The weights, indexed by kind.
    #[inline]
    #[must_use]
    pub const fn weights(&self) -> &[u32; TILE_KIND_COUNT] {
        &self.weights
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.weights.iter().map(|&w| u64::from(w)).sum()
    }

    /// Draws a kind: `r = next63 % total`, then the first kind whose
    /// cumulative weight exceeds `r`. Zero-weight kinds are never drawn.
    ///
    /// A zero-sum distribution always yields `Ground`; configs are validated
    /// before they get here.
    pub fn sample(&self, rng: &mut Lehmer) -> TileKind {
        let total = self.total();
        if total == 0 {
            return TileKind::Ground;
        }
        let mut r = rng.next63() % total;
        for (kind, &weight) in TileKind::ALL.iter().zip(&self.weights) {
            let weight = u64::from(weight);
            if r < weight {
                return *kind;
            }
            r -= weight;
        }
        TileKind::Ground
    }
}

impl Default for TileDistribution {
    fn default() -> Self {
        // ground, high-mountain, vegetated, mountain, water, contamination,
        // concrete, lowlands
        Self::new([37, 2, 14, 13, 3, 2, 0, 29])
    }
}

/// Pairwise adjacency penalties, `cost[a][b]` for kind `a` near kind `b`.
/// Negative entries are bonuses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjacencyCosts {
    matrix: [[i32; TILE_KIND_COUNT]; TILE_KIND_COUNT],
}

impl AdjacencyCosts {
    /// Creates a cost table from a raw matrix.
    #[inline]
    #[must_use]
    pub const fn new(matrix: [[i32; TILE_KIND_COUNT]; TILE_KIND_COUNT]) -> Self {
        Self { matrix }
    }

    /// Penalty for `kind` having `neighbor` nearby.
    #[inline]
    #[must_use]
    pub const fn cost(&self, kind: TileKind, neighbor: TileKind) -> i32 {
        self.matrix[kind.index()][neighbor.index()]
    }

    /// Conflict score of the cell at `coord` as it currently is.
    #[must_use]
    pub fn conflict(&self, grid: &Grid, coord: Coord, radius: u32) -> i64 {
        self.conflict_as(grid, coord, grid.kind(coord), radius)
    }

    /// Conflict score the cell at `coord` would have if it were `kind`.
    ///
    /// The window wraps around the grid edges; wherever it lands on `coord`
    /// itself (including wrapped copies on small grids) it sees `kind`.
    #[must_use]
    pub fn conflict_as(&self, grid: &Grid, coord: Coord, kind: TileKind, radius: u32) -> i64 {
        let radius = i64::from(radius);
        let (cx, cy) = (i64::from(coord.x), i64::from(coord.y));
        let mut score = 0i64;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let cell = grid.wrap(cx + dx, cy + dy);
                let neighbor = if cell == coord { kind } else { grid.kind(cell) };
                score += i64::from(self.cost(kind, neighbor));
            }
        }
        score
    }
}

impl Default for AdjacencyCosts {
    fn default() -> Self {
        Self::new([
            [0, 1, 0, 0, 1, 0, 1, 0],  // ground
            [1, 0, 1, 0, 2, 1, 1, 2],  // high mountain
            [0, 1, 0, 1, 0, 1, 1, 0],  // vegetated
            [0, -2, 0, 0, 1, 1, 1, 1], // mountain
            [1, 3, 0, 1, -3, 1, 1, 0], // water
            [0, 2, 1, 1, 1, 0, 1, 0],  // contamination
            [1, 1, 1, 1, 1, 1, 1, 1],  // concrete
            [0, 2, 0, 1, -1, 0, 1, 0], // lowlands
        ])
    }
}
