//! # Hub Concurrency Tests
//!
//! Edits, ticks, resets and snapshots racing on one hub: no torn reads,
//! no drifted index sets, no deadlocks.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use verdance_core::{Coord, TileKind, World};
use verdance_ecology::{EcologyParams, EcologySimulator};
use verdance_networking::{ClientMessage, CommandOutcome, ResetOutcome, SyncHub};
use verdance_procedural::{GeneratorConfig, WorldGenerator, WorldSeed};

fn hub(width: u32, height: u32) -> Arc<SyncHub> {
    let seed = WorldSeed::new(2024);
    let generator = WorldGenerator::new(GeneratorConfig::default()).unwrap();
    let world = generator.generate(seed, width, height).unwrap();
    let simulator = EcologySimulator::new(EcologyParams::default(), seed).unwrap();
    Arc::new(SyncHub::new(world, generator, simulator, seed))
}

fn peer() -> SocketAddr {
    "10.0.0.1:5000".parse().unwrap()
}

/// Test: Edits and ticks from several threads leave consistent index sets.
#[test]
fn test_concurrent_edits_and_ticks() {
    let hub = hub(48, 32);
    let mut handles = Vec::new();

    for t in 0..4_i64 {
        let hub = Arc::clone(&hub);
        handles.push(thread::spawn(move || {
            for i in 0..500_i64 {
                let x = (i * 7 + t * 13) % 50 - 1;
                let y = (i * 3 + t) % 34 - 1;
                let _ = hub.update_tile(x, y, (i + t) % 9);
            }
        }));
    }
    {
        let hub = Arc::clone(&hub);
        handles.push(thread::spawn(move || {
            for _ in 0..200 {
                hub.tick();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(hub.world().read(World::verify), Ok(()));
    assert_eq!(hub.accepted_edits() + hub.rejected_edits(), 2000);
    assert!(hub.rejected_edits() > 0);
    hub.world().read(|world| {
        for tile in world.grid().tiles() {
            assert!((0.0..=1.0).contains(&tile.nutrient));
        }
    });
}

/// Test: A snapshot never shows a half-applied write.
#[test]
fn test_snapshots_never_torn() {
    let hub = hub(16, 16);
    let done = Arc::new(AtomicBool::new(false));
    hub.world().write(|world| {
        for coord in world.grid().coords().collect::<Vec<_>>() {
            world.set_tile_kind(coord, TileKind::Ground).unwrap();
        }
    });

    let writer = {
        let hub = Arc::clone(&hub);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for round in 0..300_u32 {
                let kind = TileKind::ALL[(round % 8) as usize];
                hub.world().write(|world| {
                    for x in 0..16 {
                        for y in 0..16 {
                            world.set_tile_kind(Coord::new(x, y), kind).unwrap();
                        }
                    }
                });
            }
            done.store(true, Ordering::Release);
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let hub = Arc::clone(&hub);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last_revision = 0;
                while !done.load(Ordering::Acquire) {
                    let snapshot = hub.snapshot();
                    let first = snapshot.kinds[0];
                    assert!(
                        snapshot.kinds.iter().all(|&k| k == first),
                        "torn snapshot at revision {}",
                        snapshot.revision
                    );
                    assert!(snapshot.revision >= last_revision);
                    last_revision = snapshot.revision;
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

/// Test: Out-of-bounds edits are rejected and change nothing.
#[test]
fn test_out_of_bounds_rejected() {
    let hub = hub(10, 10);
    let before = hub.snapshot();

    for (x, y) in [(-1, 0), (0, -1), (10, 0), (0, 10), (i64::MAX, 3)] {
        assert!(hub.update_tile(x, y, 1).is_err(), "({x}, {y})");
    }
    assert!(hub.update_tile(3, 3, -1).is_err());
    assert!(hub.update_tile(3, 3, 8).is_err());

    assert_eq!(*hub.snapshot(), *before);
    assert_eq!(hub.world().revision(), before.revision);
}

/// Test: A reset replaces every tile and rebuilds the index sets.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reset_consistency() {
    let hub = hub(40, 30);
    for x in 0..40 {
        hub.update_tile(x, 0, 6).unwrap();
    }
    let before = hub.snapshot();

    let outcome = hub.apply(ClientMessage::ResetTiles, peer()).await;
    let CommandOutcome::Reset(ResetOutcome::Replaced { revision, .. }) = outcome else {
        panic!("unexpected outcome {outcome:?}");
    };

    let after = hub.snapshot();
    assert_eq!(after.revision, revision);
    assert!(after.revision > before.revision);
    assert_eq!((after.width, after.height), (40, 30));
    assert_ne!(after.kinds, before.kinds);
    assert_eq!(hub.world().read(World::verify), Ok(()));
}

/// Test: Resets racing with ticks and edits stay consistent.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reset_during_activity() {
    let hub = hub(60, 40);
    let ticker = {
        let hub = Arc::clone(&hub);
        tokio::task::spawn_blocking(move || {
            for i in 0..300_i64 {
                hub.tick();
                let _ = hub.update_tile(i % 60, i % 40, i % 8);
            }
        })
    };

    let mut replaced = 0;
    for _ in 0..3 {
        let a = hub.reset();
        let b = hub.reset();
        let (a, b) = tokio::join!(a, b);
        for outcome in [a.unwrap(), b.unwrap()] {
            if matches!(outcome, ResetOutcome::Replaced { .. }) {
                replaced += 1;
            }
        }
    }
    ticker.await.unwrap();

    assert!(replaced >= 3);
    assert_eq!(hub.world().swap_count(), replaced);
    assert_eq!(hub.world().read(World::verify), Ok(()));
}
