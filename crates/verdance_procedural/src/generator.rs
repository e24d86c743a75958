//! # World Generator
//!
//! Seeds every cell from a categorical distribution, then repairs the
//! terrain with least-conflicts local search.
//!
//! ## Pipeline
//!
//! ```text
//! seed cells ──► pass r=3 ──► pass r=2 ──► pass r=4 ──► pass r=2 ──► features
//!                 (one pass = W x H random visits, with replacement)
//!                                                             │
//!                 nutrient: vegetated 1.0, others baseline ◄──┘
//!                                   │
//!                                   ▼
//!                      World (index sets rebuilt once)
//! ```
//!
//! Small radii fix local clashes, large radii enforce broader consistency.
//! Generation always runs on a fresh grid; the caller swaps the finished
//! [`World`] in.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use verdance_core::{Coord, Grid, Tile, TileKind, World, TILE_KIND_COUNT};

use crate::error::{GenerationError, GenerationResult};
use crate::features::FeaturePasses;
use crate::seed::{Lehmer, WorldSeed, PURPOSE_GENERATION};
use crate::terrain::{AdjacencyCosts, TileDistribution};

/// Nutrient given to every non-vegetated tile of a new world.
pub const DEFAULT_BASELINE_NUTRIENT: f64 = 0.09;

/// Nutrient given to vegetated tiles of a new world.
pub const GENERATED_VEGETATION_NUTRIENT: f64 = 1.0;

/// Generator parameters. Loaded from the `[generator]` section of the
/// server config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Weights for the initial draw.
    pub distribution: TileDistribution,
    /// Adjacency penalties.
    pub costs: AdjacencyCosts,
    /// Starting nutrient of non-vegetated tiles.
    pub baseline_nutrient: f64,
    /// Candidate kinds drawn per conflicted cell.
    pub tries: usize,
    /// One least-conflicts pass per entry, in order.
    pub radius_schedule: Vec<u32>,
    /// Optional post-passes.
    pub features: FeaturePasses,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            distribution: TileDistribution::default(),
            costs: AdjacencyCosts::default(),
            baseline_nutrient: DEFAULT_BASELINE_NUTRIENT,
            tries: 24,
            radius_schedule: vec![3, 2, 4, 2],
            features: FeaturePasses::default(),
        }
    }
}

impl GeneratorConfig {
    /// Checks that the config can produce a coherent world.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidConfig`] for a schedule with fewer
    /// than 2 passes or fewer than 2 distinct radii, a zero-sum distribution,
    /// a baseline outside `[0, 1]`, or a water-pocket rate outside `[0, 1]`.
    pub fn validate(&self) -> GenerationResult<()> {
        if self.radius_schedule.len() < 2 {
            return Err(GenerationError::InvalidConfig(format!(
                "radius schedule needs at least 2 passes, got {}",
                self.radius_schedule.len()
            )));
        }
        let mut radii = self.radius_schedule.clone();
        radii.sort_unstable();
        radii.dedup();
        if radii.len() < 2 {
            return Err(GenerationError::InvalidConfig(
                "radius schedule needs at least 2 distinct radii".to_string(),
            ));
        }
        if self.distribution.total() == 0 {
            return Err(GenerationError::InvalidConfig(
                "tile distribution weights sum to zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.baseline_nutrient) {
            return Err(GenerationError::InvalidConfig(format!(
                "baseline nutrient {} outside [0, 1]",
                self.baseline_nutrient
            )));
        }
        if let Some(pockets) = &self.features.water_pockets {
            if !(0.0..=1.0).contains(&pockets.rate) {
                return Err(GenerationError::InvalidConfig(format!(
                    "water pocket rate {} outside [0, 1]",
                    pockets.rate
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of one least-conflicts pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Radius the pass ran at.
    pub radius: u32,
    /// Cells visited (always W x H).
    pub visits: usize,
    /// Visits that found a positive conflict score.
    pub conflicted: usize,
    /// Conflicted visits whose committed kind scored strictly lower.
    pub improved: usize,
}

/// What a generation run did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationReport {
    /// One entry per scheduled pass.
    pub passes: Vec<PassStats>,
    /// Wall time of the whole run.
    pub elapsed: Duration,
}

/// One least-conflicts pass over `grid`.
///
/// Visits W x H random cells (with replacement). A visited cell with a
/// positive conflict score gets `tries` uniformly drawn candidate kinds; the
/// lowest-scoring candidate is committed (first one wins ties). With
/// `tries == 0` conflicted cells are counted but left alone.
pub fn least_conflicts_pass(
    grid: &mut Grid,
    costs: &AdjacencyCosts,
    rng: &mut Lehmer,
    tries: usize,
    radius: u32,
) -> PassStats {
    let mut stats = PassStats {
        radius,
        ..PassStats::default()
    };
    let (width, height) = (grid.width() as usize, grid.height() as usize);

    for _ in 0..grid.len() {
        // below(n) < n, and n came from a u32.
        #[allow(clippy::cast_possible_truncation)]
        let coord = Coord::new(rng.below(width) as u32, rng.below(height) as u32);
        stats.visits += 1;

        let current = costs.conflict(grid, coord, radius);
        if current <= 0 {
            continue;
        }
        stats.conflicted += 1;

        let mut best: Option<(TileKind, i64)> = None;
        for _ in 0..tries {
            let candidate = TileKind::ALL[rng.below(TILE_KIND_COUNT)];
            let score = costs.conflict_as(grid, coord, candidate, radius);
            if best.map_or(true, |(_, least)| score < least) {
                best = Some((candidate, score));
            }
        }
        if let Some((kind, score)) = best {
            grid.set_kind(coord, kind);
            if score < current {
                stats.improved += 1;
            }
        }
    }
    stats
}

/// Builds complete worlds from a config and a seed.
#[derive(Clone, Debug)]
pub struct WorldGenerator {
    config: GeneratorConfig,
}

impl WorldGenerator {
    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidConfig`] if the config does not
    /// validate.
    pub fn new(config: GeneratorConfig) -> GenerationResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The generator's config.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates a world.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Core`] for zero dimensions.
    pub fn generate(&self, seed: WorldSeed, width: u32, height: u32) -> GenerationResult<World> {
        self.generate_with_report(seed, width, height)
            .map(|(world, _)| world)
    }

    /// Generates a world and reports what each pass did.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Core`] for zero dimensions.
    pub fn generate_with_report(
        &self,
        seed: WorldSeed,
        width: u32,
        height: u32,
    ) -> GenerationResult<(World, GenerationReport)> {
        let start = Instant::now();
        let config = &self.config;
        tracing::info!(seed = seed.value(), width, height, "generating world");

        let mut rng = seed.derive(PURPOSE_GENERATION).rng();
        let mut grid = Grid::new(
            width,
            height,
            Tile::new(TileKind::Ground, config.baseline_nutrient),
        )?;

        let coords: Vec<Coord> = grid.coords().collect();
        for &coord in &coords {
            let kind = config.distribution.sample(&mut rng);
            grid.set_kind(coord, kind);
        }

        let mut passes = Vec::with_capacity(config.radius_schedule.len());
        for &radius in &config.radius_schedule {
            let stats = least_conflicts_pass(&mut grid, &config.costs, &mut rng, config.tries, radius);
            tracing::debug!(
                radius,
                visits = stats.visits,
                conflicted = stats.conflicted,
                improved = stats.improved,
                "least-conflicts pass"
            );
            passes.push(stats);
        }

        config.features.apply(&mut grid, &mut rng);

        for &coord in &coords {
            let tile = grid.tile_mut(coord);
            tile.nutrient = if tile.kind == TileKind::Vegetated {
                GENERATED_VEGETATION_NUTRIENT
            } else {
                config.baseline_nutrient
            };
        }

        let world = World::from_grid(grid);
        let elapsed = start.elapsed();
        tracing::info!(
            elapsed_ms = elapsed.as_millis(),
            vegetated = world.index().vegetated.len(),
            water = world.index().water.sources.len(),
            "world generated"
        );
        Ok((world, GenerationReport { passes, elapsed }))
    }
}
