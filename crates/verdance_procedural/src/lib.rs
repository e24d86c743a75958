//! # VERDANCE Procedural Generation
//!
//! Deterministic terrain for the shared tile world.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same world
//! 2. **Off to the side**: Generation builds a fresh [`World`], never
//!    touching the live one
//! 3. **Tunable**: Distribution, costs and radius schedule are config, not
//!    law
//!
//! ## Core Components
//!
//! - `Lehmer` / `WorldSeed`: seeded PRNG and independent sub-streams
//! - `TileDistribution`: categorical draw for the initial terrain
//! - `AdjacencyCosts`: neighbor conflict scores
//! - `WorldGenerator`: seeding, least-conflicts passes, feature passes
//!
//! ## Example
//!
//! ```rust,ignore
//! use verdance_procedural::{GeneratorConfig, WorldGenerator, WorldSeed};
//!
//! let generator = WorldGenerator::new(GeneratorConfig::default())?;
//! let world = generator.generate(WorldSeed::new(12345), 240, 135)?;
//! assert_eq!(world.verify(), Ok(()));
//! ```
//!
//! [`World`]: verdance_core::World

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod features;
pub mod generator;
pub mod seed;
pub mod terrain;

pub use error::{GenerationError, GenerationResult};
pub use features::{FeaturePasses, StartingPlatform, WaterPockets};
pub use generator::{
    least_conflicts_pass, GenerationReport, GeneratorConfig, PassStats, WorldGenerator,
    DEFAULT_BASELINE_NUTRIENT,
};
pub use seed::{Lehmer, WorldSeed, PURPOSE_GENERATION, PURPOSE_RESET, PURPOSE_SIMULATION};
pub use terrain::{AdjacencyCosts, TileDistribution};
