//! Actions: delayed, side-effecting operations triggered by conditions.
//!
//! Actions live in an arena owned by the engine and are referred to by
//! [`ActionId`], so one action may sit in several conditions' trigger lists.
//! An action is built once and executed once per scheduled occurrence.

use srocs_types::{EntityHandle, EntityTemplate};
use tracing::{debug, info, warn};

use crate::gateway::EntityGateway;
use crate::timer::TimerTable;

/// Index of an action in the engine's action arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(pub usize);

/// Variant-specific part of an action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// Spawn an entity, rejecting it if it lands on another body.
    AddEntity(EntityTemplate),
    /// Create the named timer, or reset it to zero if it exists.
    AddTimer {
        /// Timer name.
        timer: String,
    },
    /// Raise the termination flag.
    Terminate,
}

/// An action and its dispatch delay.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    delay: u64,
    kind: ActionKind,
}

/// What executing one scheduled action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The entity was placed and registered.
    Spawned {
        /// Handle of the new entity.
        entity: EntityHandle,
    },
    /// The entity overlapped another body and was removed again.
    SpawnRejected {
        /// Type of the discarded entity.
        entity_type: String,
    },
    /// The entity was placed but its collision state could not be checked.
    SpawnUnverified {
        /// Handle of the new entity.
        entity: EntityHandle,
    },
    /// The gateway refused to build the entity.
    SpawnFailed {
        /// Explanation from the gateway.
        reason: String,
    },
    /// A timer was set to zero.
    TimerStarted {
        /// Timer name.
        timer: String,
        /// Whether an existing timer was overwritten.
        reset: bool,
    },
    /// The termination flag was raised.
    Terminated,
}

/// Mutable engine state an executing action may touch.
pub struct ExecutionContext<'a> {
    /// Tick at which the action executes.
    pub tick: u64,
    /// The timer table.
    pub timers: &'a mut TimerTable,
    /// The entity gateway.
    pub gateway: &'a mut dyn EntityGateway,
    /// Entities spawned by the scenario, removed on reset.
    pub added_entities: &'a mut Vec<EntityHandle>,
    /// The termination flag.
    pub terminate: &'a mut bool,
}

impl Action {
    /// Create an action.
    pub const fn new(delay: u64, kind: ActionKind) -> Self {
        Self { delay, kind }
    }

    /// Spawn action.
    pub const fn add_entity(delay: u64, template: EntityTemplate) -> Self {
        Self::new(delay, ActionKind::AddEntity(template))
    }

    /// Timer action.
    pub fn add_timer(delay: u64, timer: impl Into<String>) -> Self {
        Self::new(
            delay,
            ActionKind::AddTimer {
                timer: timer.into(),
            },
        )
    }

    /// Terminate action.
    pub const fn terminate(delay: u64) -> Self {
        Self::new(delay, ActionKind::Terminate)
    }

    /// Ticks between trigger and execution.
    pub const fn delay(&self) -> u64 {
        self.delay
    }

    /// Variant data.
    pub const fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Perform the action's side effect.
    pub fn execute(&self, ctx: &mut ExecutionContext<'_>) -> ActionOutcome {
        match &self.kind {
            ActionKind::AddEntity(template) => spawn_entity(template, ctx),
            ActionKind::AddTimer { timer } => {
                let reset = ctx.timers.start(timer);
                if reset {
                    warn!(timer, tick = ctx.tick, "timer already exists, reset to zero");
                } else {
                    debug!(timer, tick = ctx.tick, "timer started");
                }
                ActionOutcome::TimerStarted {
                    timer: timer.clone(),
                    reset,
                }
            }
            ActionKind::Terminate => {
                *ctx.terminate = true;
                info!(tick = ctx.tick, "scenario termination requested");
                ActionOutcome::Terminated
            }
        }
    }
}

fn spawn_entity(template: &EntityTemplate, ctx: &mut ExecutionContext<'_>) -> ActionOutcome {
    let entity_type = template.entity_type.as_str();
    let entity = match ctx.gateway.spawn(template) {
        Ok(entity) => entity,
        Err(e) => {
            warn!(entity_type, tick = ctx.tick, error = %e, "could not add entity");
            return ActionOutcome::SpawnFailed {
                reason: e.to_string(),
            };
        }
    };

    if !ctx.gateway.has_body(entity) {
        warn!(
            entity_type,
            entity = %entity,
            tick = ctx.tick,
            "added entity has no body, could not check for collisions"
        );
        ctx.added_entities.push(entity);
        return ActionOutcome::SpawnUnverified { entity };
    }

    match ctx.gateway.is_colliding(entity) {
        Ok(true) => {
            warn!(
                entity_type,
                id = template.id().unwrap_or_default(),
                tick = ctx.tick,
                "entity would have collided, not added"
            );
            if let Err(e) = ctx.gateway.remove(entity) {
                warn!(entity = %entity, error = %e, "failed to remove colliding entity");
            }
            ActionOutcome::SpawnRejected {
                entity_type: entity_type.to_owned(),
            }
        }
        Ok(false) => {
            debug!(entity_type, entity = %entity, tick = ctx.tick, "entity added");
            ctx.added_entities.push(entity);
            ActionOutcome::Spawned { entity }
        }
        Err(e) => {
            warn!(
                entity_type,
                entity = %entity,
                tick = ctx.tick,
                error = %e,
                "collision test failed, could not check for collisions"
            );
            ctx.added_entities.push(entity);
            ActionOutcome::SpawnUnverified { entity }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use srocs_types::EntityId;
    use srocs_world::Arena;

    use super::*;

    struct Harness {
        timers: TimerTable,
        arena: Arena,
        added: Vec<EntityHandle>,
        terminate: bool,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                timers: TimerTable::new(),
                arena: Arena::new(),
                added: Vec::new(),
                terminate: false,
            }
        }

        fn run(&mut self, action: &Action) -> ActionOutcome {
            let mut ctx = ExecutionContext {
                tick: 1,
                timers: &mut self.timers,
                gateway: &mut self.arena,
                added_entities: &mut self.added,
                terminate: &mut self.terminate,
            };
            action.execute(&mut ctx)
        }
    }

    fn block(id: &str, x: f64) -> EntityTemplate {
        EntityTemplate::new("block")
            .with("id", id)
            .with("position", json!([x, 0.0, 0.0]))
    }

    #[test]
    fn spawn_registers_clear_entity() {
        let mut h = Harness::new();
        let outcome = h.run(&Action::add_entity(0, block("block0", 0.0)));
        assert!(matches!(outcome, ActionOutcome::Spawned { entity } if h.added == vec![entity]));
        assert!(h.arena.find(&EntityId::from("block0")).is_some());
    }

    #[test]
    fn spawn_onto_existing_body_is_rejected() {
        let mut h = Harness::new();
        h.arena.spawn(&block("existing", 0.3)).unwrap();
        let outcome = h.run(&Action::add_entity(0, block("intruder", 0.3)));
        assert_eq!(
            outcome,
            ActionOutcome::SpawnRejected {
                entity_type: "block".to_owned()
            }
        );
        assert!(h.added.is_empty());
        assert_eq!(h.arena.len(), 1);
        assert!(h.arena.find(&EntityId::from("intruder")).is_none());
    }

    #[test]
    fn bodyless_spawn_is_kept_unverified() {
        let mut h = Harness::new();
        h.arena.spawn(&block("existing", 0.0)).unwrap();
        let outcome = h.run(&Action::add_entity(
            0,
            block("ghost", 0.0).with("body", false),
        ));
        assert!(matches!(outcome, ActionOutcome::SpawnUnverified { .. }));
        assert_eq!(h.added.len(), 1);
        assert_eq!(h.arena.len(), 2);
    }

    #[test]
    fn gateway_refusal_is_recovered() {
        let mut h = Harness::new();
        h.arena.spawn(&block("dup", 5.0)).unwrap();
        let outcome = h.run(&Action::add_entity(0, block("dup", 0.0)));
        assert!(matches!(outcome, ActionOutcome::SpawnFailed { .. }));
        assert!(h.added.is_empty());
    }

    #[test]
    fn add_timer_creates_then_resets() {
        let mut h = Harness::new();
        let action = Action::add_timer(0, "t1");
        assert_eq!(
            h.run(&action),
            ActionOutcome::TimerStarted {
                timer: "t1".to_owned(),
                reset: false
            }
        );
        h.timers.advance_all();
        assert_eq!(
            h.run(&action),
            ActionOutcome::TimerStarted {
                timer: "t1".to_owned(),
                reset: true
            }
        );
        assert_eq!(h.timers.get("t1"), Some(0));
    }

    #[test]
    fn terminate_sets_flag() {
        let mut h = Harness::new();
        assert_eq!(h.run(&Action::terminate(3)), ActionOutcome::Terminated);
        assert!(h.terminate);
    }

    #[test]
    fn delay_is_preserved() {
        assert_eq!(Action::terminate(7).delay(), 7);
        assert_eq!(Action::add_timer(2, "x").delay(), 2);
    }
}
