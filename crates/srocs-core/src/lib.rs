//! Condition/action scenario engine for modular robotic construction
//! experiments.
//!
//! A scenario is a tree of conditions over world state and timers, each
//! triggering delayed actions that add entities, start timers, or end the
//! experiment. The engine runs once per simulation tick and talks to the
//! simulator only through the [`EntityGateway`] seam.
//!
//! # Modules
//!
//! - [`action`] -- Actions, their execution and outcomes.
//! - [`builder`] -- Turn descriptor trees into a [`ScenarioGraph`].
//! - [`clock`] -- Tick counter.
//! - [`condition`] -- Condition trees and their evaluation.
//! - [`config`] -- Scenario file loading from `srocs-scenario.yaml`.
//! - [`descriptor`] -- Generic descriptor nodes deserialized from YAML.
//! - [`engine`] -- The per-tick scheduler loop.
//! - [`entity_log`] -- Per-entity trajectory logging.
//! - [`gateway`] -- [`EntityGateway`] trait and its [`Arena`] impl.
//! - [`graph`] -- Arena of actions shared by conditions.
//! - [`runner`] -- Async run loop with tick bounds and pacing.
//! - [`schedule`] -- Pending actions keyed by due tick.
//! - [`timer`] -- Named tick-counting timers.
//!
//! [`EntityGateway`]: gateway::EntityGateway
//! [`ScenarioGraph`]: graph::ScenarioGraph
//! [`Arena`]: srocs_world::Arena

pub mod action;
pub mod builder;
pub mod clock;
pub mod condition;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod entity_log;
pub mod gateway;
pub mod graph;
pub mod runner;
pub mod schedule;
pub mod timer;
