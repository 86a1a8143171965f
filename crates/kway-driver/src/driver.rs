//! Step Driver - cadence loop, pause/resume, and event fan-out

use std::collections::VecDeque;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use kway_core::{EngineConfig, EngineError, StepEvent};
use kway_engine::MergeEngine;

/// Outbound event buffer; a slow consumer applies backpressure to pacing
const EVENT_CHANNEL_CAPACITY: usize = 64;
const COMMAND_CHANNEL_CAPACITY: usize = 8;

/// Driver control commands
#[derive(Debug)]
pub enum DriverCommand {
    /// Begin stepping on the configured cadence
    Start,
    /// Stop before the next scheduled step; never aborts a step in progress
    Pause,
    /// Continue stepping after a pause
    Resume,
    /// Re-initialize the engine (last config when `None`) and stay paused
    Reset(Option<EngineConfig>),
    /// Stop stepping and end the task
    Shutdown,
}

/// Driver errors
#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("driver task is gone")]
    ChannelClosed,

    #[error("driver task failed")]
    TaskFailed,
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Handle for controlling a spawned driver task
#[derive(Debug)]
pub struct DriverHandle {
    commands: mpsc::Sender<DriverCommand>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Begin stepping
    pub async fn start(&self) -> DriverResult<()> {
        self.send(DriverCommand::Start).await
    }

    /// Pause before the next scheduled step
    pub async fn pause(&self) -> DriverResult<()> {
        self.send(DriverCommand::Pause).await
    }

    /// Resume after a pause
    pub async fn resume(&self) -> DriverResult<()> {
        self.send(DriverCommand::Resume).await
    }

    /// Discard all progress and re-initialize; the driver stays paused
    pub async fn reset(&self, config: Option<EngineConfig>) -> DriverResult<()> {
        self.send(DriverCommand::Reset(config)).await
    }

    /// Request shutdown and wait for the task to finish
    pub async fn shutdown(self) -> DriverResult<()> {
        // Ignore a closed channel: the task may already be gone.
        let _ = self.commands.send(DriverCommand::Shutdown).await;
        self.task.await.map_err(|_| DriverError::TaskFailed)
    }

    /// Wait for the task to finish on its own (event receiver dropped)
    pub async fn await_finished(self) -> DriverResult<()> {
        self.task.await.map_err(|_| DriverError::TaskFailed)
    }

    async fn send(&self, command: DriverCommand) -> DriverResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| DriverError::ChannelClosed)
    }
}

/// Step driver - owns one engine and advances it on a cadence
///
/// Each timer tick emits exactly one phase transition. When the pending
/// transitions of the current step run out, the next tick calls `advance()`
/// once and starts replaying its transcript, so sub-phases are shown at the
/// same cadence as steps and at most one `advance()` is ever in flight.
pub struct StepDriver {
    engine: MergeEngine,
    events: mpsc::Sender<StepEvent>,
    commands: mpsc::Receiver<DriverCommand>,
    interval: Duration,
    pending: VecDeque<StepEvent>,
    running: bool,
}

impl StepDriver {
    /// Spawn a driver task that takes ownership of `engine`.
    ///
    /// The engine must already be initialized; its `step_interval` sets the
    /// cadence. The driver starts paused; send [`DriverCommand::Start`] to
    /// begin. Exclusive ownership of the engine by one task is what rules
    /// out overlapping steps.
    pub fn spawn(engine: MergeEngine) -> DriverResult<(DriverHandle, mpsc::Receiver<StepEvent>)> {
        let interval = engine
            .config()
            .map(|config| config.step_interval)
            .ok_or(EngineError::NotInitialized)?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let driver = StepDriver {
            engine,
            events: event_tx,
            commands: command_rx,
            interval,
            pending: VecDeque::new(),
            running: false,
        };
        let task = tokio::spawn(driver.run());

        Ok((
            DriverHandle {
                commands: command_tx,
                task,
            },
            event_rx,
        ))
    }

    async fn run(mut self) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(DriverCommand::Start) | Some(DriverCommand::Resume) => {
                            if !self.running && !self.finished() {
                                self.running = true;
                                ticker.reset();
                                debug!("driver running");
                            }
                        }
                        Some(DriverCommand::Pause) => {
                            self.running = false;
                            debug!("driver paused");
                        }
                        Some(DriverCommand::Reset(config)) => {
                            self.running = false;
                            self.pending.clear();
                            match self.engine.reset(config) {
                                Ok(_) => {
                                    if let Some(config) = self.engine.config() {
                                        self.interval = config.step_interval;
                                    }
                                    ticker = time::interval(self.interval);
                                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                                    debug!("driver reset");
                                }
                                Err(error) => warn!(%error, "reset failed"),
                            }
                        }
                        Some(DriverCommand::Shutdown) | None => break,
                    }
                }
                _ = ticker.tick(), if self.running && !self.finished() => {
                    if !self.emit_next().await {
                        break;
                    }
                }
            }
        }
    }

    /// No more work: the current step is fully replayed and the engine is done
    fn finished(&self) -> bool {
        self.pending.is_empty() && self.engine.is_done()
    }

    /// Emit one phase transition; returns false when the receiver is gone
    async fn emit_next(&mut self) -> bool {
        if self.pending.is_empty() {
            match self.engine.advance() {
                Ok(report) => self.pending.extend(report.transitions),
                Err(error) => {
                    warn!(%error, "advance failed");
                    self.running = false;
                    return true;
                }
            }
        }

        let Some(event) = self.pending.pop_front() else {
            return true;
        };
        let done = event.is_done();

        if self.events.send(event).await.is_err() {
            debug!("event receiver dropped, stopping");
            return false;
        }

        if done {
            self.running = false;
            debug!("merge complete, driver stopped");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kway_core::EnginePhase;
    use tokio::time::timeout;

    fn tied_engine() -> MergeEngine {
        let mut config = EngineConfig::with_lanes(vec![vec![1, 3], vec![1, 2]]);
        config.step_interval = Duration::from_millis(100);
        MergeEngine::with_config(config).unwrap()
    }

    async fn collect_run(events: &mut mpsc::Receiver<StepEvent>) -> Vec<StepEvent> {
        let mut collected = Vec::new();
        while let Some(event) = events.recv().await {
            let done = event.is_done();
            collected.push(event);
            if done {
                break;
            }
        }
        collected
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_requires_initialized_engine() {
        let err = StepDriver::spawn(MergeEngine::new()).unwrap_err();
        assert!(matches!(
            err,
            DriverError::Engine(EngineError::NotInitialized)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_to_done_and_stops() {
        let (handle, mut events) = StepDriver::spawn(tied_engine()).unwrap();
        handle.start().await.unwrap();

        let run = collect_run(&mut events).await;
        let last = run.last().unwrap();
        assert_eq!(last.phase, EnginePhase::Done);
        assert_eq!(last.output, vec![1, 1, 2, 3]);

        // Nothing further arrives, even after another Start.
        assert!(timeout(Duration::from_secs(2), events.recv()).await.is_err());
        handle.start().await.unwrap();
        assert!(timeout(Duration::from_secs(2), events.recv()).await.is_err());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_phases_arrive_in_order() {
        let (handle, mut events) = StepDriver::spawn(tied_engine()).unwrap();
        handle.start().await.unwrap();
        let run = collect_run(&mut events).await;
        handle.shutdown().await.unwrap();

        // Four extractions of three transitions each, plus the terminal Done.
        assert_eq!(run.len(), 13);
        for step in run[..12].chunks(3) {
            assert!(matches!(step[0].phase, EnginePhase::Comparing(_)));
            assert!(matches!(step[1].phase, EnginePhase::FoundMinimum { .. }));
            assert_eq!(step[2].phase, EnginePhase::Draining);
        }

        // Tie on value 1: the lower-indexed lane wins, visible through the
        // driver exactly as the engine reported it.
        assert_eq!(run[1].current_lane, Some(0));
        assert_eq!(run[1].current_value, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_takes_effect_before_next_step() {
        let (handle, mut events) = StepDriver::spawn(tied_engine()).unwrap();
        handle.start().await.unwrap();

        let first = events.recv().await.unwrap();
        assert!(matches!(first.phase, EnginePhase::Comparing(_)));

        handle.pause().await.unwrap();
        assert!(timeout(Duration::from_secs(2), events.recv()).await.is_err());

        // Resuming continues mid-step: the minimum of the paused step is
        // revealed next, not recomputed from scratch.
        handle.resume().await.unwrap();
        let next = events.recv().await.unwrap();
        assert_eq!(next.phase, EnginePhase::FoundMinimum { lane: 0, value: 1 });

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restarts_from_pristine_lanes() {
        let (handle, mut events) = StepDriver::spawn(tied_engine()).unwrap();
        handle.start().await.unwrap();

        // One full step and the start of the next.
        for _ in 0..4 {
            events.recv().await.unwrap();
        }

        handle.reset(None).await.unwrap();
        assert!(timeout(Duration::from_secs(2), events.recv()).await.is_err());

        handle.start().await.unwrap();
        let first = events.recv().await.unwrap();
        assert_eq!(first.lanes, vec![vec![1, 3], vec![1, 2]]);
        assert!(first.output.is_empty());

        let run = collect_run(&mut events).await;
        assert_eq!(run.last().unwrap().output, vec![1, 1, 2, 3]);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_with_new_config() {
        let (handle, mut events) = StepDriver::spawn(tied_engine()).unwrap();

        let mut config = EngineConfig::with_lanes(vec![vec![7], vec![8]]);
        config.step_interval = Duration::from_millis(200);
        handle.reset(Some(config)).await.unwrap();

        handle.start().await.unwrap();
        let run = collect_run(&mut events).await;
        assert_eq!(run.last().unwrap().output, vec![7, 8]);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_event_channel() {
        let (handle, mut events) = StepDriver::spawn(tied_engine()).unwrap();
        handle.shutdown().await.unwrap();
        assert!(events.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_receiver_drop_stops_the_task() {
        let (handle, events) = StepDriver::spawn(tied_engine()).unwrap();
        drop(events);
        handle.start().await.unwrap();
        handle.await_finished().await.unwrap();
    }
}
