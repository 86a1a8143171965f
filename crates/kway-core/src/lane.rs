//! Lane - one pre-sorted input sequence

use std::collections::VecDeque;

use crate::{EngineError, EngineResult};

/// One pre-sorted input lane.
///
/// Values are ascending and only ever leave from the head, so a lane built
/// sorted stays sorted for its whole lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lane {
    values: VecDeque<i64>,
}

impl Lane {
    /// Build a lane from already-sorted values.
    ///
    /// Fails with [`EngineError::UnsortedLane`] if any adjacent pair is out
    /// of order. `index` is only used for error reporting.
    pub fn from_sorted(index: usize, values: Vec<i64>) -> EngineResult<Self> {
        if values.windows(2).any(|w| w[0] > w[1]) {
            return Err(EngineError::UnsortedLane { lane: index });
        }
        Ok(Lane {
            values: values.into(),
        })
    }

    /// Build a lane from values in any order, sorting them first.
    pub fn from_unsorted(mut values: Vec<i64>) -> Self {
        values.sort_unstable();
        Lane {
            values: values.into(),
        }
    }

    /// Current head (smallest remaining value), if any
    pub fn head(&self) -> Option<i64> {
        self.values.front().copied()
    }

    /// Remove and return the head
    pub fn pop_head(&mut self) -> Option<i64> {
        self.values.pop_front()
    }

    /// Number of remaining values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Is the lane drained?
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Remaining values, head first
    pub fn to_vec(&self) -> Vec<i64> {
        self.values.iter().copied().collect()
    }
}
