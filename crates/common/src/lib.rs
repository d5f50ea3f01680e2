//! Shared types for the lifegrid workspace.
//!
//! # Invariants
//! - A `GridSize` is always non-empty; invalid dimensions never leave this crate.
//! - Cell arrays are flat and row-major: `index = y * width + x`.
//! - `GridUniform` is two consecutive `u32`s, width then height, matching the WGSL `vec2<u32>`.

mod types;

use std::time::Duration;

pub use types::{ALIVE, CellState, DEAD, GridError, GridSize, GridUniform, workgroup_count};

/// Side length of the square reference grid.
pub const GRID_SIZE: u32 = 64;

/// Side length of one compute tile (workgroup) of the update kernel.
pub const WORKGROUP_SIZE: u32 = 8;

/// Wall-clock interval between scheduler firings.
pub const UPDATE_INTERVAL: Duration = Duration::from_millis(200);

/// Probability that a cell starts alive. Cells are alive when a uniform draw exceeds `0.6`.
pub const ALIVE_PROBABILITY: f64 = 0.4;

/// Seed used when the host does not pick one.
pub const DEFAULT_SEED: u64 = 42;

pub fn crate_info() -> &'static str {
    "lifegrid-common v0.1.0"
}
