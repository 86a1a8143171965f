//! Step events - observable notifications for a presentation layer
//!
//! Every field is an owned copy. A consumer never holds a reference into
//! engine internals and cannot mutate them.

use crate::EnginePhase;

/// One observable notification, emitted per phase transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepEvent {
    /// Phase this transition entered
    pub phase: EnginePhase,
    /// Indices of lanes that still hold values
    pub active_lanes: Vec<usize>,
    /// Lane the current minimum was found in, once known
    pub current_lane: Option<usize>,
    /// The current minimum value, once known
    pub current_value: Option<i64>,
    /// Lane contents at this transition, head first
    pub lanes: Vec<Vec<i64>>,
    /// Output contents at this transition
    pub output: Vec<i64>,
}

impl StepEvent {
    /// Is this the terminal notification of a run?
    pub fn is_done(&self) -> bool {
        self.phase.is_done()
    }
}
