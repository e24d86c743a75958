//! # Generation Quality Tests
//!
//! Structural properties of generated worlds: valid tiles, consistent
//! index sets, reproducible seeds, and terrain that actually converged.

use verdance_core::{Coord, TileKind};
use verdance_procedural::{
    AdjacencyCosts, GeneratorConfig, Lehmer, TileDistribution, WaterPockets, WorldGenerator,
    WorldSeed,
};

fn generator() -> WorldGenerator {
    WorldGenerator::new(GeneratorConfig::default()).expect("default config is valid")
}

/// Test: Every tile has a valid kind and an in-range nutrient.
#[test]
fn test_tiles_in_range() {
    let world = generator().generate(WorldSeed::new(42), 120, 70).unwrap();

    for tile in world.grid().tiles() {
        assert!(tile.kind.as_u8() <= 7);
        assert!((0.0..=1.0).contains(&tile.nutrient));
    }
}

/// Test: Index sets agree with the grid straight after generation.
#[test]
fn test_index_sets_consistent() {
    for seed in [1, 2, 3] {
        let world = generator().generate(WorldSeed::new(seed), 80, 45).unwrap();
        assert_eq!(world.verify(), Ok(()), "seed {seed}");

        for coord in world.index().frontier.iter() {
            assert_eq!(world.grid().kind(coord), TileKind::Ground);
        }
        assert_eq!(
            world.index().vegetated.len(),
            world.grid().count_kind(TileKind::Vegetated)
        );
    }
}

/// Test: Same seed, same world. Different seed, different world.
#[test]
fn test_deterministic_by_seed() {
    let a = generator().generate(WorldSeed::new(777), 60, 40).unwrap();
    let b = generator().generate(WorldSeed::new(777), 60, 40).unwrap();
    let c = generator().generate(WorldSeed::new(778), 60, 40).unwrap();

    assert_eq!(a.snapshot(), b.snapshot());
    assert_ne!(a.snapshot().kinds, c.snapshot().kinds);
}

/// Test: The seeding draw approximates its weights.
#[test]
fn test_distribution_approximation() {
    let distribution = TileDistribution::default();
    let mut rng = Lehmer::new(2024);
    let mut counts = [0usize; 8];
    let samples = 100_000;
    for _ in 0..samples {
        counts[distribution.sample(&mut rng).index()] += 1;
    }

    for (kind, &weight) in TileKind::ALL.iter().zip(distribution.weights()) {
        #[allow(clippy::cast_precision_loss)]
        let observed = counts[kind.index()] as f64 / samples as f64;
        let expected = f64::from(weight) / 100.0;
        assert!(
            (observed - expected).abs() < 0.01,
            "{kind:?}: observed {observed:.3}, expected {expected:.3}"
        );
    }
}

/// Test: The search leaves fewer conflicted cells than it started with.
#[test]
fn test_search_converges() {
    let costs = AdjacencyCosts::default();
    let (width, height) = (80, 45);
    let seeded_only = GeneratorConfig {
        tries: 0,
        ..GeneratorConfig::default()
    };
    let raw = WorldGenerator::new(seeded_only)
        .unwrap()
        .generate(WorldSeed::new(5), width, height)
        .unwrap();
    let searched = generator().generate(WorldSeed::new(5), width, height).unwrap();

    let conflicted = |grid: &verdance_core::Grid| {
        grid.coords()
            .filter(|&coord| costs.conflict(grid, coord, 2) > 0)
            .count()
    };
    let before = conflicted(raw.grid());
    let after = conflicted(searched.grid());
    assert!(
        after < before,
        "search left {after} conflicted cells out of {before}"
    );
}

/// Test: Water pockets add water on top of the searched terrain.
#[test]
fn test_water_pockets_feature() {
    let mut config = GeneratorConfig::default();
    config.features.water_pockets = Some(WaterPockets { rate: 0.05 });
    let with_pockets = WorldGenerator::new(config)
        .unwrap()
        .generate(WorldSeed::new(8), 60, 40)
        .unwrap();
    let without = generator().generate(WorldSeed::new(8), 60, 40).unwrap();

    assert!(
        with_pockets.grid().count_kind(TileKind::Water)
            > without.grid().count_kind(TileKind::Water)
    );
    assert_eq!(with_pockets.verify(), Ok(()));
}

/// Test: A 1x1 world still generates.
#[test]
fn test_tiny_world() {
    let world = generator().generate(WorldSeed::new(1), 1, 1).unwrap();
    assert_eq!(world.grid().len(), 1);
    assert!(world.grid().kind(Coord::new(0, 0)).as_u8() <= 7);
}
