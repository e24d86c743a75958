//! # Synchronization for the Shared World
//!
//! One simulation task, many connection tasks, one world.
//!
//! ## The Problem
//!
//! ```text
//! Simulation task:    WRITE every tick
//! Reader tasks:       WRITE on client edits and resets
//! Broadcaster tasks:  READ a full snapshot every 125 ms
//!
//! Without synchronization: torn snapshots, index sets out of step
//! ```
//!
//! ## The Solution: Single Writer, Cached Snapshots
//!
//! ```text
//! write(|world| ...)   exclusive, bumps revision
//! snapshot()           shared, rebuilt at most once per revision
//! swap(world)          replaces the whole world under one write lock
//! ```
//!
//! Lock guards never leave this module, so they can never be held across an
//! `.await`.

mod shared_world;

pub use shared_world::SharedWorld;
