//! Scenario run loop.
//!
//! [`run_scenario`] drives a [`ScenarioEngine`] against a
//! [`SimulationWorld`] until the scenario terminates itself or a tick
//! bound is reached. Each iteration:
//!
//! 1. advances the [`TickClock`],
//! 2. advances the world (physics step),
//! 3. runs one engine step,
//! 4. writes per-entity log lines, if enabled,
//! 5. checks the stop conditions.
//!
//! Between ticks the loop sleeps for `tick_interval_ms` on the tokio
//! timer, so a paced run never blocks the runtime.

use srocs_world::Arena;
use tracing::{info, warn};

use crate::clock::{ClockError, TickClock};
use crate::engine::{ScenarioEngine, TickSummary};
use crate::entity_log::{self, EntityLogSink};
use crate::gateway::EntityGateway;

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// A world the run loop can step forward in time.
pub trait SimulationWorld: EntityGateway {
    /// Advance the world by one physics step.
    fn advance(&mut self);
}

impl SimulationWorld for Arena {
    fn advance(&mut self) {
        Arena::advance(self);
    }
}

/// Run bounds and pacing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Stop after this many ticks (0 = until terminated).
    pub max_ticks: u64,
    /// Milliseconds slept between ticks.
    pub tick_interval_ms: u64,
}

/// Where and what to write per-entity log lines.
pub struct EntityLogging<'a> {
    /// Entity types whose members are logged.
    pub entity_types: &'a [String],
    /// Destination of the log lines.
    pub sink: &'a mut dyn EntityLogSink,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// A terminate action fired.
    Terminated,
    /// The configured tick bound was reached.
    MaxTicksReached,
}

/// Result of a run.
#[derive(Debug)]
pub struct RunResult {
    /// Why the run ended.
    pub end_reason: RunEndReason,
    /// Number of ticks executed.
    pub total_ticks: u64,
    /// Summary of the last tick executed.
    pub final_summary: Option<TickSummary>,
}

/// Run the scenario until it terminates or `options.max_ticks` ticks have
/// executed.
///
/// # Errors
///
/// Returns [`RunnerError::Clock`] if the tick counter overflows.
pub async fn run_scenario<W: SimulationWorld>(
    engine: &mut ScenarioEngine,
    world: &mut W,
    clock: &mut TickClock,
    options: RunOptions,
    mut logging: Option<EntityLogging<'_>>,
) -> Result<RunResult, RunnerError> {
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = options.max_ticks,
        tick_interval_ms = options.tick_interval_ms,
        start_tick = clock.tick(),
        "scenario starting"
    );

    if options.max_ticks == 0 && engine.conditions().is_empty() {
        warn!("no conditions and no tick bound; the run will never end on its own");
    }

    loop {
        let tick = clock.advance()?;
        world.advance();

        let summary = engine.step(tick, world);
        total_ticks = total_ticks.saturating_add(1);

        if let Some(log) = logging.as_mut() {
            entity_log::log_entities(tick, &*world, log.entity_types, &mut *log.sink);
        }

        if summary.terminated {
            info!(tick, "scenario terminated");
            return Ok(RunResult {
                end_reason: RunEndReason::Terminated,
                total_ticks,
                final_summary: Some(summary),
            });
        }

        if options.max_ticks > 0 && total_ticks >= options.max_ticks {
            info!(tick, max_ticks = options.max_ticks, "tick limit reached");
            return Ok(RunResult {
                end_reason: RunEndReason::MaxTicksReached,
                total_ticks,
                final_summary: Some(summary),
            });
        }

        if options.tick_interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(options.tick_interval_ms)).await;
        }
    }
}

/// Log the end of a run.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "scenario ended"
    );
}
