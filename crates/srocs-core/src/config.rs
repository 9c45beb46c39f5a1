//! Scenario configuration loading and typed config structures.
//!
//! A scenario lives in a single YAML file (`srocs-scenario.yaml` by
//! default). It describes how long to run, what to log, which entities
//! populate the arena at start, and the condition/action tree that drives
//! the experiment. Every section is optional and falls back to defaults.

use std::path::Path;

use serde::Deserialize;
use srocs_types::EntityTemplate;

use crate::builder::{self, BuildError};
use crate::descriptor::DescriptorNode;
use crate::graph::ScenarioGraph;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level scenario configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScenarioConfig {
    /// Run bounds and pacing.
    #[serde(default)]
    pub scenario: ScenarioSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Initial arena population.
    #[serde(default)]
    pub arena: ArenaConfig,

    /// Top-level condition descriptors, in evaluation order.
    #[serde(default)]
    pub conditions: Vec<DescriptorNode>,
}

impl ScenarioConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `SROCS_LOG_DIR` overrides `logging.entity_log.directory` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.logging.entity_log.apply_env_overrides();
        Ok(config)
    }

    /// Build the condition/action graph from the `conditions` section.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] in the descriptor tree.
    pub fn build_graph(&self) -> Result<ScenarioGraph, BuildError> {
        builder::build_graph(&self.conditions)
    }

    /// Templates for the entities listed in `arena.entities`.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] for the first malformed entity descriptor.
    pub fn arena_templates(&self) -> Result<Vec<EntityTemplate>, BuildError> {
        self.arena
            .entities
            .iter()
            .enumerate()
            .map(|(index, entity)| {
                builder::entity_template(entity, &format!("arena.entities[{index}]"))
            })
            .collect()
    }
}

/// Run bounds and pacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioSettings {
    /// Human-readable scenario name.
    #[serde(default = "default_scenario_name")]
    pub name: String,

    /// Stop after this many ticks (0 = until terminated).
    #[serde(default)]
    pub max_ticks: u64,

    /// Real-time milliseconds between ticks (0 = as fast as possible).
    #[serde(default)]
    pub tick_interval_ms: u64,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            name: default_scenario_name(),
            max_ticks: 0,
            tick_interval_ms: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Per-entity trajectory logs.
    #[serde(default)]
    pub entity_log: EntityLogConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            entity_log: EntityLogConfig::default(),
        }
    }
}

/// Per-entity trajectory log configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntityLogConfig {
    /// Whether entity logs are written.
    #[serde(default)]
    pub enabled: bool,

    /// Directory receiving one file per entity.
    #[serde(default = "default_log_directory")]
    pub directory: String,

    /// Entity types whose members are logged.
    #[serde(default = "default_logged_types")]
    pub entity_types: Vec<String>,
}

impl EntityLogConfig {
    /// Override the log directory with `SROCS_LOG_DIR` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SROCS_LOG_DIR") {
            self.directory = val;
        }
    }
}

impl Default for EntityLogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: default_log_directory(),
            entity_types: default_logged_types(),
        }
    }
}

/// Initial arena population.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArenaConfig {
    /// Entity descriptors, each `{ <entity_type>: { attributes } }`.
    #[serde(default)]
    pub entities: Vec<serde_yml::Value>,
}

fn default_scenario_name() -> String {
    String::from("srocs")
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_directory() -> String {
    String::from("logs")
}

fn default_logged_types() -> Vec<String> {
    vec![String::from("builderbot")]
}
