//! Watch a 4-way merge unfold step by step
//!
//! Spawns a driver on the default 4x4 configuration and prints every
//! observable phase until the merge completes.

use kway_core::{EngineConfig, EnginePhase};
use kway_driver::StepDriver;
use kway_engine::MergeEngine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let engine = MergeEngine::with_config(EngineConfig::default())?;
    println!("=== kway: 4-way merge, one step every 500ms ===\n");

    let (handle, mut events) = StepDriver::spawn(engine)?;
    handle.start().await?;

    while let Some(event) = events.recv().await {
        match &event.phase {
            EnginePhase::Comparing(active) => {
                println!("comparing heads of lanes {active:?}");
            }
            EnginePhase::FoundMinimum { lane, value } => {
                println!("  minimum {value} in lane {lane}");
            }
            EnginePhase::Draining => {
                println!("  output: {:?}", event.output);
            }
            EnginePhase::Done => {
                println!("\ndone: {:?}", event.output);
                break;
            }
            EnginePhase::Idle => {}
        }
    }

    handle.shutdown().await?;
    Ok(())
}
