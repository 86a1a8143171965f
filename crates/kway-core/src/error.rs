//! Error types for the kway merge engine

use thiserror::Error;

/// Core engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // Configuration errors
    #[error("lane count {got} outside supported range {min}..={max}")]
    LaneCountOutOfRange { got: usize, min: usize, max: usize },

    #[error("lane size {got} outside supported range {min}..={max}")]
    LaneSizeOutOfRange { got: usize, min: usize, max: usize },

    #[error("step interval {got_ms}ms outside supported range {min_ms}..={max_ms}ms")]
    StepIntervalOutOfRange { got_ms: u64, min_ms: u64, max_ms: u64 },

    #[error("lane {lane} is not sorted ascending")]
    UnsortedLane { lane: usize },

    // Lifecycle errors
    #[error("engine not initialized")]
    NotInitialized,
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
