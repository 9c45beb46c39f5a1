//! The scheduler loop: one call to [`ScenarioEngine::step`] per tick.
//!
//! Each step runs these phases in order:
//!
//! 1. **Timers** -- every timer advances by one.
//! 2. **Triggers** -- every enabled top-level condition is evaluated; for
//!    each one that holds, each of its actions is scheduled at
//!    `tick + delay`, and fire-once conditions disable themselves.
//! 3. **Dispatch** -- every occurrence due this tick is removed from the
//!    schedule and executed, in schedule order.
//!
//! Nothing in a step returns an error. Recoverable problems are logged as
//! warnings and reported through [`ActionOutcome`]s in the [`TickSummary`].

use srocs_types::EntityHandle;
use tracing::{debug, info, warn};

use crate::action::{Action, ActionOutcome, ExecutionContext};
use crate::condition::{Condition, EvaluationContext};
use crate::gateway::EntityGateway;
use crate::graph::{GraphError, ScenarioGraph};
use crate::schedule::PendingSchedule;
use crate::timer::TimerTable;

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick that was executed.
    pub tick: u64,
    /// Indices of top-level conditions that triggered this tick.
    pub triggered: Vec<usize>,
    /// Outcome of every action executed this tick, in execution order.
    pub outcomes: Vec<ActionOutcome>,
    /// Termination flag after the tick.
    pub terminated: bool,
}

/// Condition/action engine state.
#[derive(Debug, Clone)]
pub struct ScenarioEngine {
    actions: Vec<Action>,
    conditions: Vec<Condition>,
    schedule: PendingSchedule,
    timers: TimerTable,
    added_entities: Vec<EntityHandle>,
    terminate: bool,
}

impl ScenarioEngine {
    /// Create an engine over a graph.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if a condition references a missing action.
    pub fn new(graph: ScenarioGraph) -> Result<Self, GraphError> {
        graph.validate()?;
        let (actions, conditions) = graph.into_parts();
        info!(
            conditions = conditions.len(),
            actions = actions.len(),
            "scenario engine initialized"
        );
        Ok(Self {
            actions,
            conditions,
            schedule: PendingSchedule::new(),
            timers: TimerTable::new(),
            added_entities: Vec::new(),
            terminate: false,
        })
    }

    /// Run one tick.
    pub fn step(&mut self, tick: u64, gateway: &mut dyn EntityGateway) -> TickSummary {
        // Phase 1: timers
        self.timers.advance_all();

        // Phase 2: triggers
        let mut triggered = Vec::new();
        {
            let ctx = EvaluationContext {
                timers: &self.timers,
                gateway: &*gateway,
            };
            for (index, condition) in self.conditions.iter_mut().enumerate() {
                if !condition.is_enabled() || !condition.evaluate(&ctx) {
                    continue;
                }
                for &id in condition.actions() {
                    let Some(action) = self.actions.get(id.0) else {
                        continue;
                    };
                    match tick.checked_add(action.delay()) {
                        Some(target) => self.schedule.insert(target, id),
                        None => warn!(
                            condition = index,
                            delay = action.delay(),
                            tick,
                            "action delay overflows the tick counter, not scheduled"
                        ),
                    }
                }
                condition.mark_triggered();
                debug!(
                    condition = index,
                    tick,
                    actions = condition.actions().len(),
                    once = condition.is_once(),
                    "condition triggered"
                );
                triggered.push(index);
            }
        }

        // Phase 3: dispatch
        let due = self.schedule.take_due(tick);
        let mut outcomes = Vec::with_capacity(due.len());
        for id in due {
            let Some(action) = self.actions.get(id.0) else {
                continue;
            };
            let mut ctx = ExecutionContext {
                tick,
                timers: &mut self.timers,
                gateway: &mut *gateway,
                added_entities: &mut self.added_entities,
                terminate: &mut self.terminate,
            };
            outcomes.push(action.execute(&mut ctx));
        }

        TickSummary {
            tick,
            triggered,
            outcomes,
            terminated: self.terminate,
        }
    }

    /// Return to the initial state.
    ///
    /// Removes every entity the scenario added, drops pending occurrences,
    /// clears timers and the termination flag, and re-enables every
    /// condition. Must not be called mid-step.
    pub fn reset(&mut self, gateway: &mut dyn EntityGateway) {
        let removed = self.added_entities.len();
        for handle in self.added_entities.drain(..) {
            if let Err(e) = gateway.remove(handle) {
                warn!(entity = %handle, error = %e, "failed to remove added entity on reset");
            }
        }
        self.schedule.clear();
        self.timers.clear();
        self.terminate = false;
        for condition in &mut self.conditions {
            condition.reset();
        }
        info!(removed_entities = removed, "scenario engine reset");
    }

    /// Whether a terminate action has executed.
    pub const fn is_terminated(&self) -> bool {
        self.terminate
    }

    /// The timer table.
    pub const fn timers(&self) -> &TimerTable {
        &self.timers
    }

    /// The pending action schedule.
    pub const fn schedule(&self) -> &PendingSchedule {
        &self.schedule
    }

    /// Entities spawned by the scenario and still owned by it.
    pub fn added_entities(&self) -> &[EntityHandle] {
        &self.added_entities
    }

    /// Top-level conditions, in declaration order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The action arena.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use srocs_types::{EntityTemplate, Vec3};
    use srocs_world::Arena;

    use super::*;
    use crate::action::ActionId;
    use crate::condition::ProximityCondition;

    fn engine(graph: ScenarioGraph) -> ScenarioEngine {
        ScenarioEngine::new(graph).unwrap()
    }

    /// Step the engine from `from` to `to` inclusive, returning summaries.
    fn run(
        engine: &mut ScenarioEngine,
        arena: &mut Arena,
        from: u64,
        to: u64,
    ) -> Vec<TickSummary> {
        (from..=to).map(|tick| engine.step(tick, arena)).collect()
    }

    #[test]
    fn fire_once_triggers_exactly_once() {
        let mut graph = ScenarioGraph::new();
        let start = graph.add_action(Action::add_timer(0, "t"));
        graph.add_condition(Condition::all(Vec::new()).fire_once(true).triggers(start));
        let mut engine = engine(graph);
        let mut arena = Arena::new();

        let summaries = run(&mut engine, &mut arena, 1, 5);
        let triggers: usize = summaries.iter().map(|s| s.triggered.len()).sum();
        assert_eq!(triggers, 1);
        assert!(!engine.conditions().first().unwrap().is_enabled());
    }

    #[test]
    fn repeating_condition_schedules_every_tick() {
        let mut graph = ScenarioGraph::new();
        let start = graph.add_action(Action::add_timer(10, "t"));
        graph.add_condition(Condition::all(Vec::new()).triggers(start));
        let mut engine = engine(graph);
        let mut arena = Arena::new();

        run(&mut engine, &mut arena, 1, 4);
        assert_eq!(engine.schedule().len(), 4);
        for tick in 11..=14 {
            assert_eq!(engine.schedule().at(tick), &[ActionId(0)]);
        }
    }

    #[test]
    fn delayed_action_executes_at_exact_tick() {
        let mut graph = ScenarioGraph::new();
        let stop = graph.add_action(Action::terminate(3));
        graph.add_condition(Condition::all(Vec::new()).fire_once(true).triggers(stop));
        let mut engine = engine(graph);
        let mut arena = Arena::new();

        let summaries = run(&mut engine, &mut arena, 10, 14);
        let executed_at: Vec<u64> = summaries
            .iter()
            .filter(|s| !s.outcomes.is_empty())
            .map(|s| s.tick)
            .collect();
        assert_eq!(executed_at, vec![13]);
        assert!(!summaries.get(2).unwrap().terminated);
        assert!(summaries.get(3).unwrap().terminated);
        assert!(engine.is_terminated());
    }

    #[test]
    fn zero_delay_executes_same_tick() {
        let mut graph = ScenarioGraph::new();
        let stop = graph.add_action(Action::terminate(0));
        graph.add_condition(Condition::all(Vec::new()).triggers(stop));
        let mut engine = engine(graph);
        let summary = engine.step(1, &mut Arena::new());
        assert_eq!(summary.outcomes, vec![ActionOutcome::Terminated]);
        assert!(summary.terminated);
    }

    #[test]
    fn shared_action_runs_once_per_occurrence() {
        let mut graph = ScenarioGraph::new();
        let start = graph.add_action(Action::add_timer(0, "shared"));
        graph.add_condition(Condition::all(Vec::new()).fire_once(true).triggers(start));
        graph.add_condition(Condition::all(Vec::new()).fire_once(true).triggers(start));
        let mut engine = engine(graph);

        let summary = engine.step(1, &mut Arena::new());
        assert_eq!(summary.triggered, vec![0, 1]);
        assert_eq!(
            summary.outcomes,
            vec![
                ActionOutcome::TimerStarted {
                    timer: "shared".to_owned(),
                    reset: false
                },
                ActionOutcome::TimerStarted {
                    timer: "shared".to_owned(),
                    reset: true
                },
            ]
        );
    }

    #[test]
    fn timer_counts_from_zero_after_creation() {
        let mut graph = ScenarioGraph::new();
        let start = graph.add_action(Action::add_timer(0, "t1"));
        graph.add_condition(Condition::all(Vec::new()).fire_once(true).triggers(start));
        let mut engine = engine(graph);
        let mut arena = Arena::new();

        engine.step(1, &mut arena);
        assert_eq!(engine.timers().get("t1"), Some(0));
        run(&mut engine, &mut arena, 2, 4);
        assert_eq!(engine.timers().get("t1"), Some(3));
    }

    #[test]
    fn conditions_are_independent() {
        let mut graph = ScenarioGraph::new();
        let a = graph.add_action(Action::add_timer(0, "a"));
        graph.add_condition(Condition::any(Vec::new()).triggers(a));
        graph.add_condition(Condition::all(Vec::new()).fire_once(true).triggers(a));
        let mut engine = engine(graph);

        let summary = engine.step(1, &mut Arena::new());
        assert_eq!(summary.triggered, vec![1]);
    }

    #[test]
    fn proximity_trigger_follows_moving_entity() {
        let mut arena = Arena::new();
        arena
            .spawn(
                &EntityTemplate::new("builderbot")
                    .with("id", "robot")
                    .with("position", json!([0.0, 0.0, 0.0])),
            )
            .unwrap();

        let mut graph = ScenarioGraph::new();
        let stop = graph.add_action(Action::terminate(0));
        graph.add_condition(
            Condition::entity(ProximityCondition {
                entity_type: Some("builderbot".to_owned()),
                entity_id: None,
                position: Vec3::new(1.0, 0.0, 0.0),
                threshold: 0.1,
            })
            .fire_once(true)
            .triggers(stop),
        );
        let mut engine = engine(graph);

        assert!(!engine.step(1, &mut arena).terminated);
        let robot = arena.find(&"robot".into()).unwrap();
        arena.move_to(robot, Vec3::new(0.95, 0.0, 0.0)).unwrap();
        assert!(engine.step(2, &mut arena).terminated);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut arena = Arena::new();
        let mut graph = ScenarioGraph::new();
        let spawn = graph.add_action(Action::add_entity(
            0,
            EntityTemplate::new("block").with("id", "spawned"),
        ));
        let start = graph.add_action(Action::add_timer(0, "t"));
        let stop = graph.add_action(Action::terminate(0));
        let late = graph.add_action(Action::add_timer(50, "late"));
        graph.add_condition(
            Condition::all(Vec::new())
                .fire_once(true)
                .with_actions(vec![spawn, start, stop, late]),
        );
        let mut engine = engine(graph);

        engine.step(1, &mut arena);
        assert!(engine.is_terminated());
        assert_eq!(engine.added_entities().len(), 1);
        assert_eq!(arena.len(), 1);
        assert_eq!(engine.schedule().len(), 1);

        engine.reset(&mut arena);
        engine.reset(&mut arena);
        assert!(!engine.is_terminated());
        assert!(engine.added_entities().is_empty());
        assert!(engine.timers().is_empty());
        assert!(engine.schedule().is_empty());
        assert!(arena.is_empty());
        assert!(engine.conditions().iter().all(Condition::is_enabled));

        // the occurrence scheduled for tick 51 was discarded
        let summaries = run(&mut engine, &mut arena, 51, 51);
        assert!(!summaries.iter().any(|s| s
            .outcomes
            .iter()
            .any(|o| matches!(o, ActionOutcome::TimerStarted { timer, .. } if timer == "late"))));
    }

    #[test]
    fn dangling_graph_is_rejected() {
        let mut graph = ScenarioGraph::new();
        graph.add_condition(Condition::all(Vec::new()).triggers(ActionId(0)));
        assert!(ScenarioEngine::new(graph).is_err());
    }
}
