//! Asynchronous Game of Life core.
//!
//! A [`Simulation`] owns the authoritative [`Grid`] and a single worker
//! thread. Every frame it applies the latest diff produced by the worker,
//! then hands the worker the next generation to compute. Diffs travel through
//! a lock-free single-producer / single-consumer ring ([`channel`]).
//!
//! ```no_run
//! use std::time::Duration;
//! use conway_core::{patterns, Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::default();
//! let seed = patterns::find("Glider").map(|p| p.centered(config.width, config.height));
//! let mut sim = Simulation::new(config, &seed.unwrap_or_default())?;
//! loop {
//!     sim.advance(Duration::from_millis(16), &mut ());
//! }
//! # Ok::<(), conway_core::SimulationError>(())
//! ```

pub mod channel;
pub mod controller;
pub mod coord;
pub mod engine;
pub mod error;
pub mod grid;
pub mod patterns;
pub mod task_slot;

pub use controller::{PresentationSink, Simulation, SimulationConfig, Tick};
pub use coord::Coord;
pub use engine::{CellChange, DiffBatch, Rule};
pub use error::{SimulationError, SimulationResult};
pub use grid::Grid;
