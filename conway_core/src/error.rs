// error.rs - Errors raised while setting up a simulation
//
// Once running, the core has no recoverable errors: a full channel is
// backpressure, an empty one means "nothing new yet", and a worker panic is
// re-raised on the controller thread.

use thiserror::Error;

use crate::coord::Coord;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("seed cell {pos} lies outside the {width}x{height} grid")]
    SeedOutOfBounds { pos: Coord, width: i32, height: i32 },

    #[error("diff channel needs at least 2 slots, got {0}")]
    InvalidCapacity(usize),

    #[error("failed to start worker: {0}")]
    Executor(#[from] std::io::Error),
}

pub type SimulationResult<T> = Result<T, SimulationError>;
