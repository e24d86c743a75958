//! # Ecology Simulator
//!
//! One tick = five stages in a fixed order:
//!
//! ```text
//! ┌───────────────┬───────────────┬──────────────┬──────────────┬─────────┐
//! │ 1. DECAY      │ 2. WATER      │ 3. PRESSURE  │ 4. GROWTH    │ 5. END  │
//! │ whole grid    │ water rings   │ rock rings,  │ frontier     │ advance │
//! │ vegetation    │ feed          │ contamination│ grows, may   │ cycle,  │
//! │ may wither    │ vegetation    │ ring drain   │ flip green   │ revision│
//! └───────────────┴───────────────┴──────────────┴──────────────┴─────────┘
//! ```
//!
//! Only stage 1 scans the whole grid. Every other stage walks an index set,
//! so its cost follows the number of affected cells.

use rand::Rng;
use verdance_core::{Coord, Grid, IndexSets, TileKind, World, RING_1};
use verdance_procedural::{Lehmer, WorldSeed, PURPOSE_SIMULATION};

use crate::cycle::DayCycle;
use crate::error::EcologyResult;
use crate::params::EcologyParams;

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Ground tiles that turned vegetated.
    pub greened: usize,
    /// Vegetated tiles that reverted to ground.
    pub withered: usize,
    /// Vegetated tiles after the tick.
    pub vegetated: usize,
    /// Frontier tiles after the tick.
    pub frontier: usize,
}

/// Advances a [`World`] one tick at a time.
#[derive(Clone, Debug)]
pub struct EcologySimulator {
    params: EcologyParams,
    rng: Lehmer,
    cycle: DayCycle,
    ticks: u64,
}

impl EcologySimulator {
    /// Creates a simulator with its own random stream derived from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EcologyError::InvalidParams`] if the params do not
    /// validate.
    pub fn new(params: EcologyParams, seed: WorldSeed) -> EcologyResult<Self> {
        params.validate()?;
        let mut rng = seed.derive(PURPOSE_SIMULATION).rng();
        let cycle = DayCycle::random(params.ticks_per_cycle, &mut rng);
        Ok(Self {
            params,
            rng,
            cycle,
            ticks: 0,
        })
    }

    /// Replaces the day cycle (e.g. to pin the decay multiplier).
    #[must_use]
    pub fn with_day_cycle(mut self, cycle: DayCycle) -> Self {
        self.cycle = cycle;
        self
    }

    /// The model parameters.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &EcologyParams {
        &self.params
    }

    /// The day cycle.
    #[inline]
    #[must_use]
    pub fn cycle(&self) -> &DayCycle {
        &self.cycle
    }

    /// Ticks run so far.
    #[inline]
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs one tick on `world` and bumps its revision.
    pub fn tick(&mut self, world: &mut World) -> TickReport {
        let (grid, index) = world.parts_mut();

        let withered = self.decay(grid, index);
        self.irrigate(grid, index);
        self.apply_pressure(grid, index);
        let greened = self.grow(grid, index);

        let report = TickReport {
            tick: self.ticks + 1,
            greened,
            withered,
            vegetated: index.vegetated.len(),
            frontier: index.frontier.len(),
        };

        self.cycle.advance();
        self.ticks += 1;
        world.bump_revision();

        tracing::trace!(
            tick = report.tick,
            greened,
            withered,
            vegetated = report.vegetated,
            frontier = report.frontier,
            "ecology tick"
        );
        report
    }

    /// Stage 1: random decay over the whole grid. Vegetation that drops
    /// below the cutoff reverts to ground.
    fn decay(&mut self, grid: &mut Grid, index: &mut IndexSets) -> usize {
        let params = &self.params;
        let scale = self.cycle.multiplier() + 0.5;
        let mut withered = 0;

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let coord = Coord::new(x, y);
                let tile = grid.tile_mut(coord);
                if !tile.kind.is_growable() || !self.rng.gen_bool(params.decay_chance) {
                    continue;
                }
                let r: f64 = self.rng.gen();
                tile.add_nutrient(-(params.decay_scale * r * scale));

                if tile.kind == TileKind::Vegetated && tile.nutrient < params.vegetation_cutoff {
                    let previous = grid.set_kind(coord, TileKind::Ground);
                    index.reconcile(grid, coord, previous);
                    withered += 1;
                }
            }
        }
        withered
    }

    /// Stage 2: water feeds vegetation and frontier in its rings.
    fn irrigate(&self, grid: &mut Grid, index: &IndexSets) {
        let params = &self.params;
        let rings = [
            (&index.water.ring1, 1.0),
            (&index.water.ring2, 1.0 / 3.0),
        ];
        for (ring, share) in rings {
            for coord in ring.iter() {
                if index.vegetated.contains(coord) {
                    grid.tile_mut(coord)
                        .add_nutrient(params.water_bonus_vegetated * share);
                }
                if index.frontier.contains(coord) {
                    grid.tile_mut(coord)
                        .add_nutrient(params.water_bonus_frontier * share);
                }
            }
        }
    }

    /// Stage 3: rock and contamination drain living tiles in their rings.
    fn apply_pressure(&self, grid: &mut Grid, index: &IndexSets) {
        let params = &self.params;
        let rings = [
            (&index.inorganic.ring1, params.inorganic_ring1_penalty),
            (&index.inorganic.ring2, params.inorganic_ring2_penalty),
            (&index.contamination.ring1, params.contamination_penalty),
        ];
        for (ring, penalty) in rings {
            for coord in ring.iter() {
                let tile = grid.tile_mut(coord);
                if tile.kind.is_growable() && tile.nutrient > 0.0 {
                    tile.add_nutrient(-penalty);
                }
            }
        }
    }

    /// Stage 4: frontier tiles grow and may turn vegetated.
    ///
    /// Works on the frontier as it stood when the stage began; tiles that
    /// join it during the stage grow from the next tick on.
    fn grow(&mut self, grid: &mut Grid, index: &mut IndexSets) -> usize {
        let params = &self.params;
        let current: Vec<Coord> = index.frontier.iter().collect();
        let mut greened = 0;

        for coord in current {
            if grid.kind(coord) != TileKind::Ground || !self.rng.gen_bool(params.growth_chance) {
                continue;
            }
            let r: f64 = self.rng.gen();
            let tile = grid.tile_mut(coord);
            tile.add_nutrient(params.growth_scale * (r + params.growth_floor));
            if tile.nutrient < params.vegetation_cutoff {
                continue;
            }

            grid.set_kind(coord, TileKind::Vegetated);
            index.vegetated.insert(coord);
            index.frontier.remove(coord);
            for neighbor in grid.neighbors(coord, &RING_1) {
                if grid.kind(neighbor) == TileKind::Ground {
                    index.frontier.insert(neighbor);
                }
            }
            greened += 1;
        }
        greened
    }
}
