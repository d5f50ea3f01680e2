//! Life Kernel: the host-side model of the simulation.
//!
//! The GPU pipeline is the production path; this crate is the bit-exact
//! reference it is checked against, plus the bookkeeping the scheduler shares
//! with it.
//!
//! # Invariants
//! - A `Generation` is immutable once produced; `next()` returns a new one.
//! - Stepping is pure: the same initial generation and tick count give the same result.
//! - Within one tick the buffer being written is never the buffer being read by the update.

pub mod clock;
pub mod generation;
pub mod parity;
pub mod rules;
pub mod world;

pub use clock::TickClock;
pub use generation::Generation;
pub use parity::{StepCounter, TickRoles};
pub use rules::next_state;
pub use world::LifeWorld;
