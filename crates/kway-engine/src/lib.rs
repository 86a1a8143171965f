//! kway Engine - the k-way merge state machine
//!
//! A pure, synchronous engine: `advance()` performs exactly one extraction,
//! always returns, never blocks, and has no hidden suspension points. All
//! pacing belongs to the driver. Given the same lanes and the same sequence
//! of `advance()` calls, the state sequence and final output are identical.

pub mod engine;

pub use engine::*;
