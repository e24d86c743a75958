//! # Ecology Property Tests
//!
//! Long-running invariants of the simulator on generated and hand-built
//! worlds.

use verdance_core::{Coord, TileKind, World};
use verdance_ecology::{DayCycle, EcologyParams, EcologySimulator};
use verdance_procedural::{GeneratorConfig, WorldGenerator, WorldSeed};

fn generated_world(seed: u64) -> World {
    WorldGenerator::new(GeneratorConfig::default())
        .expect("default config is valid")
        .generate(WorldSeed::new(seed), 60, 40)
        .expect("valid dimensions")
}

/// Test: Tiles stay in range and index sets stay exact over many ticks.
#[test]
fn test_invariants_hold_over_many_ticks() {
    let mut world = generated_world(21);
    let mut simulator =
        EcologySimulator::new(EcologyParams::default(), WorldSeed::new(21)).unwrap();

    for tick in 0..300 {
        simulator.tick(&mut world);
        if tick % 25 == 0 {
            assert_eq!(world.verify(), Ok(()), "after tick {tick}");
        }
        for tile in world.grid().tiles() {
            assert!((0.0..=1.0).contains(&tile.nutrient));
        }
    }
    assert_eq!(world.verify(), Ok(()));
    for coord in world.index().frontier.iter() {
        assert_eq!(world.grid().kind(coord), TileKind::Ground);
    }
}

/// Test: Ticks interleaved with edits keep the index sets exact.
#[test]
fn test_invariants_hold_with_edits() {
    let mut world = generated_world(4);
    let mut simulator =
        EcologySimulator::new(EcologyParams::default(), WorldSeed::new(4)).unwrap();

    for step in 0u32..200 {
        let x = i64::from((step * 7) % 60);
        let y = i64::from((step * 13) % 40);
        world.apply_edit(x, y, i64::from(step % 8)).unwrap();
        simulator.tick(&mut world);
    }
    assert_eq!(world.verify(), Ok(()));
}

/// Test: A tile with no neighbors of note decays monotonically to zero.
#[test]
fn test_isolated_tile_decays_monotonically() {
    let mut world = World::new(9, 9).unwrap();
    world.parts_mut().0.tile_mut(Coord::new(4, 4)).nutrient = 0.9;
    let mut simulator =
        EcologySimulator::new(EcologyParams::default(), WorldSeed::new(77)).unwrap();

    let mut previous = 0.9;
    for _ in 0..2000 {
        simulator.tick(&mut world);
        let current = world.grid().tile(Coord::new(4, 4)).nutrient;
        assert!(current <= previous);
        assert!(current >= 0.0);
        previous = current;
    }
    assert!(previous < 0.01, "nutrient still {previous} after 2000 ticks");
}

/// Test: Water placed by an edit feeds ring 1 on the next tick and leaves
/// distance-3 cells alone.
#[test]
fn test_water_scenario() {
    let mut world = World::new(10, 10).unwrap();
    for (x, y) in [(1, 1), (3, 3)] {
        world.apply_edit(x, y, 2).unwrap();
        world.parts_mut().0.tile_mut(Coord::new(x as u32, y as u32)).nutrient = 0.5;
    }
    world.apply_edit(0, 0, 4).unwrap();

    let params = EcologyParams {
        decay_chance: 0.0,
        growth_chance: 0.0,
        ..EcologyParams::default()
    };
    let mut simulator = EcologySimulator::new(params, WorldSeed::new(1))
        .unwrap()
        .with_day_cycle(DayCycle::new(480, 0));
    simulator.tick(&mut world);

    let near = world.grid().tile(Coord::new(1, 1)).nutrient;
    let far = world.grid().tile(Coord::new(3, 3)).nutrient;
    assert!((near - 0.55).abs() < 1e-9, "ring-1 tile at {near}");
    assert!((far - 0.5).abs() < 1e-9, "distance-3 tile at {far}");
}

/// Test: A ground tile at the cutoff flips when its growth roll succeeds.
#[test]
fn test_growth_flip_scenario() {
    let mut world = World::new(8, 8).unwrap();
    world.apply_edit(4, 4, 2).unwrap();
    {
        let (grid, _) = world.parts_mut();
        grid.tile_mut(Coord::new(4, 4)).nutrient = 1.0;
        grid.tile_mut(Coord::new(5, 4)).nutrient = 0.18;
    }
    assert!(world.index().frontier.contains(Coord::new(5, 4)));

    let params = EcologyParams {
        decay_chance: 0.0,
        growth_chance: 1.0,
        ..EcologyParams::default()
    };
    let mut simulator = EcologySimulator::new(params, WorldSeed::new(2)).unwrap();
    simulator.tick(&mut world);

    assert_eq!(world.grid().kind(Coord::new(5, 4)), TileKind::Vegetated);
    assert!(world.index().vegetated.contains(Coord::new(5, 4)));
    for y in [3, 4, 5] {
        assert!(world.index().frontier.contains(Coord::new(6, y)));
    }
    assert_eq!(world.verify(), Ok(()));
}

/// Test: Same seeds, same history.
#[test]
fn test_simulation_is_deterministic() {
    let run = || {
        let mut world = generated_world(9);
        let mut simulator =
            EcologySimulator::new(EcologyParams::default(), WorldSeed::new(9)).unwrap();
        for _ in 0..50 {
            simulator.tick(&mut world);
        }
        world.snapshot()
    };
    assert_eq!(run(), run());
}
