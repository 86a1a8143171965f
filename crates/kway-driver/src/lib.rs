//! kway Driver - paced stepping of the merge engine
//!
//! The engine decides what happens; this crate decides when it is shown.
//! A driver task owns one engine, calls `advance()` on a timer cadence, and
//! replays each step's phase transitions one per tick over an mpsc channel
//! for a presentation layer to consume. Pause, resume, reset, and shutdown
//! arrive over a command channel and take effect before the next scheduled
//! step; a step already taken is never rolled back.

pub mod driver;

pub use driver::*;
