//! Error types for the scenario runner binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the run so
//! `main` can propagate with `?`.

/// Top-level error for the scenario runner binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Scenario file loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: srocs_core::config::ConfigError,
    },

    /// A descriptor in the scenario file was malformed.
    #[error("scenario build error: {source}")]
    Build {
        /// The underlying build error.
        #[from]
        source: srocs_core::builder::BuildError,
    },

    /// The condition/action graph was inconsistent.
    #[error("graph error: {source}")]
    Graph {
        /// The underlying graph error.
        #[from]
        source: srocs_core::graph::GraphError,
    },

    /// An initial arena entity could not be placed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: srocs_world::WorldError,
    },

    /// The run loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: srocs_core::runner::RunnerError,
    },

    /// The entity log directory could not be prepared or flushed.
    #[error("entity log error: {source}")]
    EntityLog {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
