//! kway Core - Fundamental types and primitives
//!
//! This crate defines the types shared by the merge engine and its driver:
//! - Lanes (pre-sorted input sequences, consumed from the head)
//! - Engine phases and per-step observable events
//! - Configuration with bounds and generated lane data
//! - Error taxonomy

pub mod config;
pub mod error;
pub mod event;
pub mod lane;
pub mod phase;

pub use config::*;
pub use error::*;
pub use event::*;
pub use lane::*;
pub use phase::*;
