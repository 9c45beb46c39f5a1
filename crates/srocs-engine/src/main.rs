//! Scenario runner for modular robotic construction experiments.
//!
//! Loads a scenario file, places the initial entities in the arena, builds
//! the condition/action graph, and runs the tick loop until the scenario
//! terminates or its tick bound is reached.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the path given as the first argument, or
//!    `srocs-scenario.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Populate the arena from `arena.entities`
//! 4. Build the scenario graph and engine
//! 5. Open the entity log directory, if enabled
//! 6. Run the scenario
//! 7. Log the result

mod csv_sink;
mod error;

use std::path::{Path, PathBuf};

use srocs_core::clock::TickClock;
use srocs_core::config::ScenarioConfig;
use srocs_core::engine::ScenarioEngine;
use srocs_core::runner::{self, EntityLogging, RunOptions};
use srocs_world::Arena;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::csv_sink::CsvLogSink;
use crate::error::EngineError;

/// Default scenario file, relative to the working directory.
const DEFAULT_SCENARIO_PATH: &str = "srocs-scenario.yaml";

/// Application entry point for the scenario runner.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or built, or if the
/// run itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_SCENARIO_PATH), PathBuf::from);
    let (config, found) = load_config(&path)?;

    // 2. Initialize structured logging. RUST_LOG wins over the file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("srocs-engine starting");
    if found {
        info!(
            path = %path.display(),
            scenario = config.scenario.name,
            max_ticks = config.scenario.max_ticks,
            tick_interval_ms = config.scenario.tick_interval_ms,
            "Configuration loaded"
        );
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
    }

    // 3. Populate the arena.
    let mut arena = populate_arena(&config)?;
    info!(entity_count = arena.len(), "Arena populated");

    // 4. Build the scenario engine.
    let graph = config.build_graph().map_err(EngineError::from)?;
    let mut engine = ScenarioEngine::new(graph).map_err(EngineError::from)?;

    // 5. Entity logs.
    let entity_log = &config.logging.entity_log;
    let mut sink = if entity_log.enabled {
        let sink = CsvLogSink::create(&entity_log.directory).map_err(EngineError::from)?;
        info!(
            directory = entity_log.directory,
            entity_types = ?entity_log.entity_types,
            "Entity logging enabled"
        );
        Some(sink)
    } else {
        None
    };
    let logging = sink.as_mut().map(|sink| EntityLogging {
        entity_types: &entity_log.entity_types,
        sink,
    });

    // 6. Run.
    let options = RunOptions {
        max_ticks: config.scenario.max_ticks,
        tick_interval_ms: config.scenario.tick_interval_ms,
    };
    let mut clock = TickClock::new();
    let result = Box::pin(runner::run_scenario(
        &mut engine,
        &mut arena,
        &mut clock,
        options,
        logging,
    ))
    .await
    .map_err(EngineError::from)?;

    if let Some(sink) = sink.as_mut() {
        sink.flush().map_err(EngineError::from)?;
    }

    // 7. Log the result.
    runner::log_run_end(&result);
    info!(
        entities_added = engine.added_entities().len(),
        arena_entities = arena.len(),
        "srocs-engine finished"
    );

    Ok(())
}

/// Load the scenario file, falling back to defaults when it is absent.
///
/// The second value reports whether the file existed. Logging is not
/// initialized yet, so the caller reports it.
fn load_config(path: &Path) -> Result<(ScenarioConfig, bool), EngineError> {
    if path.exists() {
        Ok((ScenarioConfig::from_file(path)?, true))
    } else {
        Ok((ScenarioConfig::default(), false))
    }
}

/// Spawn every entity listed under `arena.entities`.
fn populate_arena(config: &ScenarioConfig) -> Result<Arena, EngineError> {
    let mut arena = Arena::new();
    for template in config.arena_templates()? {
        let handle = arena.spawn(&template)?;
        info!(
            entity_type = template.entity_type,
            id = template.id().unwrap_or_default(),
            handle = %handle,
            "Entity placed"
        );
    }
    Ok(arena)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, found) = load_config(&dir.path().join("absent.yaml")).unwrap();
        assert!(!found);
        assert_eq!(config, ScenarioConfig::default());
    }

    #[test]
    fn arena_is_populated_from_config() {
        let config = ScenarioConfig::parse(
            r"
arena:
  entities:
    - builderbot: { id: builderbot0, position: [0.0, 0.0, 0.0] }
    - block: { id: block0, position: [0.5, 0.0, 0.0] }
",
        )
        .unwrap();
        let arena = populate_arena(&config).unwrap();
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.of_type("block").len(), 1);
    }

    #[test]
    fn duplicate_arena_ids_abort_startup() {
        let config = ScenarioConfig::parse(
            r"
arena:
  entities:
    - block: { id: block0, position: [0.0, 0.0, 0.0] }
    - block: { id: block0, position: [1.0, 0.0, 0.0] }
",
        )
        .unwrap();
        assert!(matches!(
            populate_arena(&config),
            Err(EngineError::World { .. })
        ));
    }
}
