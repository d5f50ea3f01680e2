//! wgpu backend for the lifegrid simulator.
//!
//! Two generation buffers live on the device for the whole run. Each tick one
//! compute dispatch reads buffer `step % 2` and writes the other, then one
//! instanced draw reads the buffer just written. Both passes go out in a
//! single submission, so the device orders the write before the read.
//!
//! # Invariants
//! - The buffer written by the update kernel is never the one it reads.
//! - The render kernel only reads the buffer the update kernel wrote this tick.
//! - Buffers and binding sets are created once; ticks never reallocate or rebind.
//! - A failed tick does not advance the step counter.

mod bindings;
mod context;
mod error;
mod grid_state;
mod pipelines;
mod shaders;
mod simulator;

pub use bindings::ResourceBindings;
pub use context::{GpuContext, missing_capabilities};
pub use error::LifeError;
pub use grid_state::GridState;
pub use pipelines::LifePipelines;
pub use shaders::{cell_shader, update_shader};
pub use simulator::{FrameTarget, LifeSimulator};
