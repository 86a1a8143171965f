//! Engine phases
//!
//! Exactly one phase is current at any time. Phases only change inside
//! `initialize`, `advance`, and `reset` on the engine.

/// The merge engine's current phase
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnginePhase {
    /// Initialized, no step taken yet
    Idle,
    /// Heads of the listed lanes are candidates for extraction
    Comparing(Vec<usize>),
    /// The minimum head has been identified but not yet extracted
    FoundMinimum { lane: usize, value: i64 },
    /// The extracted value has moved to the output; highlights can clear
    Draining,
    /// Every lane is empty; the merge is complete
    Done,
}

impl EnginePhase {
    /// Is the merge complete?
    pub fn is_done(&self) -> bool {
        matches!(self, EnginePhase::Done)
    }
}
