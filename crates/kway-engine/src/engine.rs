//! Merge Engine - repeated linear scan for the minimum head
//!
//! Classic k-way merge: O(N) per extracted element, O(N*M) overall. N and M
//! are small and the goal is observability of each step, not throughput.
//! Tie-break: strict `<` against a running best, so on equal heads the lane
//! with the lowest index wins.

use tracing::{debug, trace};

use kway_core::{EngineConfig, EngineError, EnginePhase, EngineResult, Lane, StepEvent};

/// Read-only view of engine state for rendering
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineSnapshot {
    /// Lane contents, head first
    pub lanes: Vec<Vec<i64>>,
    /// Output contents
    pub output: Vec<i64>,
    /// Current phase
    pub phase: EnginePhase,
}

/// Counters accumulated across a run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Extractions performed
    pub steps: u64,
    /// Head comparisons performed
    pub comparisons: u64,
}

/// Transcript of one `advance` call
///
/// Transitions are ordered as they happened, so the candidate set
/// (`Comparing`) is always observable before the minimum is revealed
/// (`FoundMinimum`). A driver replays these at its own cadence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepReport {
    /// Phase transitions, in order
    pub transitions: Vec<StepEvent>,
    /// Phase the engine ended the call in
    pub phase: EnginePhase,
}

impl StepReport {
    /// Did this step finish the merge?
    pub fn is_done(&self) -> bool {
        self.phase.is_done()
    }
}

/// The merge engine - a pure synchronous state machine
///
/// Owns the lanes and the output exclusively. The presentation layer only
/// ever sees owned copies via [`StepEvent`] and [`MergeEngine::snapshot`].
pub struct MergeEngine {
    lanes: Vec<Lane>,
    output: Vec<i64>,
    phase: EnginePhase,
    config: Option<EngineConfig>,
    stats: EngineStats,
}

impl MergeEngine {
    /// Create an uninitialized engine
    ///
    /// `advance` and `reset` fail with [`EngineError::NotInitialized`] until
    /// [`MergeEngine::initialize`] succeeds.
    pub fn new() -> Self {
        MergeEngine {
            lanes: Vec::new(),
            output: Vec::new(),
            phase: EnginePhase::Idle,
            config: None,
            stats: EngineStats::default(),
        }
    }

    /// Create an engine already initialized with `config`
    pub fn with_config(config: EngineConfig) -> EngineResult<Self> {
        let mut engine = MergeEngine::new();
        engine.initialize(config)?;
        Ok(engine)
    }

    /// Build lanes from `config`, clear the output, and go to `Idle`.
    ///
    /// All-or-nothing: on a configuration error no existing state is
    /// touched. If every lane is empty the engine goes directly to `Done`.
    pub fn initialize(&mut self, config: EngineConfig) -> EngineResult<EnginePhase> {
        let lanes = config.build_lanes()?;

        let total: usize = lanes.iter().map(Lane::len).sum();
        self.phase = if lanes.iter().all(Lane::is_empty) {
            EnginePhase::Done
        } else {
            EnginePhase::Idle
        };
        self.lanes = lanes;
        self.output = Vec::with_capacity(total);
        self.stats = EngineStats::default();
        self.config = Some(config);

        debug!(
            lanes = self.lanes.len(),
            total, "engine initialized"
        );
        Ok(self.phase.clone())
    }

    /// Re-initialize with `config`, or with the last configuration when
    /// `None`, discarding all progress.
    pub fn reset(&mut self, config: Option<EngineConfig>) -> EngineResult<EnginePhase> {
        let config = config
            .or_else(|| self.config.clone())
            .ok_or(EngineError::NotInitialized)?;
        self.initialize(config)
    }

    /// Perform exactly one logical step: find the minimum head across all
    /// active lanes, extract it, and append it to the output.
    ///
    /// Returns the transcript of phase transitions for the step. After
    /// `Done` this is an idempotent no-op whose only transition is `Done`.
    pub fn advance(&mut self) -> EngineResult<StepReport> {
        if self.config.is_none() {
            return Err(EngineError::NotInitialized);
        }

        if self.phase.is_done() {
            let transitions = vec![self.observe(Vec::new(), None, None)];
            return Ok(StepReport {
                transitions,
                phase: self.phase.clone(),
            });
        }

        let active: Vec<usize> = self
            .lanes
            .iter()
            .enumerate()
            .filter(|(_, lane)| !lane.is_empty())
            .map(|(index, _)| index)
            .collect();

        if active.is_empty() {
            self.phase = EnginePhase::Done;
            let transitions = vec![self.observe(Vec::new(), None, None)];
            return Ok(StepReport {
                transitions,
                phase: self.phase.clone(),
            });
        }

        let mut transitions = Vec::with_capacity(4);

        // Candidate phase: every active head is in play. No mutation here,
        // so a driver can show the comparison set before the result.
        self.phase = EnginePhase::Comparing(active.clone());
        transitions.push(self.observe(active.clone(), None, None));
        trace!(?active, "comparing lane heads");

        // Linear scan with strict `<`: on equal heads the lowest index wins.
        let mut winner = active[0];
        let mut minimum = i64::MAX;
        for &index in &active {
            let Some(head) = self.lanes[index].head() else {
                continue;
            };
            self.stats.comparisons += 1;
            if head < minimum {
                minimum = head;
                winner = index;
            }
        }

        self.phase = EnginePhase::FoundMinimum {
            lane: winner,
            value: minimum,
        };
        transitions.push(self.observe(active.clone(), Some(winner), Some(minimum)));

        if let Some(value) = self.lanes[winner].pop_head() {
            self.output.push(value);
        }
        self.stats.steps += 1;
        debug!(lane = winner, value = minimum, "extracted minimum");

        // Settling phase: no mutation, lets a driver clear highlights.
        self.phase = EnginePhase::Draining;
        transitions.push(self.observe(active, Some(winner), Some(minimum)));

        if self.lanes.iter().all(Lane::is_empty) {
            self.phase = EnginePhase::Done;
            transitions.push(self.observe(Vec::new(), None, None));
            debug!(extracted = self.output.len(), "merge complete");
        }

        Ok(StepReport {
            transitions,
            phase: self.phase.clone(),
        })
    }

    /// Drain the merge without pacing. Returns the final output.
    pub fn run_to_done(&mut self) -> EngineResult<Vec<i64>> {
        while !self.phase.is_done() {
            self.advance()?;
        }
        Ok(self.output.clone())
    }

    /// Read-only copy of lanes, output, and phase
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            lanes: self.lanes.iter().map(Lane::to_vec).collect(),
            output: self.output.clone(),
            phase: self.phase.clone(),
        }
    }

    /// Current phase
    pub fn phase(&self) -> &EnginePhase {
        &self.phase
    }

    /// Is the merge complete?
    pub fn is_done(&self) -> bool {
        self.phase.is_done()
    }

    /// Output so far
    pub fn output(&self) -> &[i64] {
        &self.output
    }

    /// Configuration of the current run, if initialized
    pub fn config(&self) -> Option<&EngineConfig> {
        self.config.as_ref()
    }

    /// Run counters
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    fn observe(
        &self,
        active_lanes: Vec<usize>,
        current_lane: Option<usize>,
        current_value: Option<i64>,
    ) -> StepEvent {
        StepEvent {
            phase: self.phase.clone(),
            active_lanes,
            current_lane,
            current_value,
            lanes: self.lanes.iter().map(Lane::to_vec).collect(),
            output: self.output.clone(),
        }
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new()
    }
}
