//! # VERDANCE Ecology
//!
//! Nutrient growth and decay on the shared tile world.
//!
//! ## The Model
//!
//! Every ground or vegetated tile carries a nutrient level in `[0, 1]`.
//! Ground that crosses the vegetation cutoff turns vegetated; vegetation
//! that drops below it reverts. Water feeds nearby tiles, rock and
//! contamination drain them, and a day cycle modulates decay.
//!
//! ## Example
//!
//! ```rust,ignore
//! use verdance_ecology::{EcologyParams, EcologySimulator};
//! use verdance_procedural::WorldSeed;
//!
//! let mut simulator = EcologySimulator::new(EcologyParams::default(), WorldSeed::new(1))?;
//! let report = simulator.tick(&mut world);
//! println!("{} tiles greened", report.greened);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cycle;
pub mod error;
pub mod params;
pub mod simulator;

pub use cycle::DayCycle;
pub use error::{EcologyError, EcologyResult};
pub use params::EcologyParams;
pub use simulator::{EcologySimulator, TickReport};
