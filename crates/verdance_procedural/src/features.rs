//! # Feature Passes
//!
//! Optional touches applied after the least-conflicts search. All are off
//! by default.

use rand::Rng;
use serde::{Deserialize, Serialize};
use verdance_core::{Coord, Grid, TileKind};

use crate::seed::Lehmer;

/// Side of the starting platform square.
pub const PLATFORM_SIZE: u32 = 7;

/// Chance that a cell inside a water pocket actually becomes water.
const POCKET_FILL: f64 = 0.75;

/// Which feature passes run, and with what parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturePasses {
    /// Scattered small lakes.
    pub water_pockets: Option<WaterPockets>,
    /// A concrete landing pad.
    pub starting_platform: Option<StartingPlatform>,
}

impl FeaturePasses {
    /// Runs the enabled passes in order: water pockets, then the platform.
    pub fn apply(&self, grid: &mut Grid, rng: &mut Lehmer) {
        if let Some(pockets) = &self.water_pockets {
            pockets.apply(grid, rng);
        }
        if let Some(platform) = &self.starting_platform {
            platform.apply(grid);
        }
    }
}

/// Scatters 1-3 x 1-3 pockets of water.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterPockets {
    /// Per-cell chance of starting a pocket.
    pub rate: f64,
}

impl Default for WaterPockets {
    fn default() -> Self {
        Self { rate: 0.001 }
    }
}

impl WaterPockets {
    /// Every cell may start a pocket anchored at its top-left corner; pocket
    /// cells are clipped at the grid edges and each one is filled with
    /// probability 0.75.
    pub fn apply(&self, grid: &mut Grid, rng: &mut Lehmer) {
        let rate = self.rate.clamp(0.0, 1.0);
        let anchors: Vec<Coord> = grid.coords().collect();
        for anchor in anchors {
            if !rng.gen_bool(rate) {
                continue;
            }
            let width = 1 + rng.below(3);
            let height = 1 + rng.below(3);
            for dy in 0..height {
                for dx in 0..width {
                    // Pocket sizes are at most 3.
                    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                    let cell = grid.offset(anchor, dx as i32, dy as i32);
                    if let Some(cell) = cell {
                        if rng.gen_bool(POCKET_FILL) {
                            grid.set_kind(cell, TileKind::Water);
                        }
                    }
                }
            }
        }
    }
}

/// A 7 x 7 concrete square missing its four corners.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingPlatform {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
}

impl Default for StartingPlatform {
    fn default() -> Self {
        Self { x: 10, y: 10 }
    }
}

impl StartingPlatform {
    /// Paints the platform, clipped to the grid.
    pub fn apply(&self, grid: &mut Grid) {
        let last = PLATFORM_SIZE - 1;
        for dy in 0..PLATFORM_SIZE {
            for dx in 0..PLATFORM_SIZE {
                let corner = (dx == 0 || dx == last) && (dy == 0 || dy == last);
                if corner {
                    continue;
                }
                let (x, y) = (i64::from(self.x) + i64::from(dx), i64::from(self.y) + i64::from(dy));
                if let Ok(cell) = grid.checked_coord(x, y) {
                    grid.set_kind(cell, TileKind::Concrete);
                }
            }
        }
    }
}
