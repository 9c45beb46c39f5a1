//! The condition tree: predicates evaluated once per tick.
//!
//! A [`Condition`] is either a leaf predicate (entity proximity, timer
//! value) or a combinator over child conditions. Each condition carries the
//! actions it triggers, an `enabled` flag and a fire-once flag, but only
//! top-level conditions are driven by the engine; children contribute
//! solely through their parent's [`Condition::evaluate`].
//!
//! Evaluation is read-only: it may consult the timer table and query the
//! gateway but never mutates either.

use srocs_types::{EntityHandle, EntityId, Vec3};
use tracing::{debug, warn};

use crate::action::ActionId;
use crate::gateway::EntityGateway;
use crate::timer::TimerTable;

/// Read-only state a condition may consult during evaluation.
#[derive(Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// The timer table, already advanced for this tick.
    pub timers: &'a TimerTable,
    /// The entity gateway.
    pub gateway: &'a dyn EntityGateway,
}

/// Proximity predicate: some matching entity is within `threshold` of
/// `position`.
///
/// With an `entity_type`, every entity of that type is a candidate,
/// restricted to the one with `entity_id` when that is also set. Without a
/// type, exactly the entity with `entity_id` is a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityCondition {
    /// Type filter.
    pub entity_type: Option<String>,
    /// Id filter.
    pub entity_id: Option<EntityId>,
    /// Fixed target point.
    pub position: Vec3,
    /// Strict upper bound on the distance.
    pub threshold: f64,
}

impl ProximityCondition {
    fn candidates(&self, gateway: &dyn EntityGateway) -> Vec<EntityHandle> {
        match (&self.entity_type, &self.entity_id) {
            (Some(entity_type), id_filter) => match gateway.entities_by_type(entity_type) {
                Ok(handles) => match id_filter {
                    Some(id) => handles
                        .into_iter()
                        .filter(|&handle| gateway.entity_id(handle).as_ref() == Some(id))
                        .collect(),
                    None => handles,
                },
                Err(e) => {
                    warn!(entity_type, error = %e, "entity query failed, treating as no match");
                    Vec::new()
                }
            },
            (None, Some(id)) => match gateway.entity_by_id(id) {
                Ok(Some(handle)) => vec![handle],
                Ok(None) => {
                    debug!(entity = %id, "entity not found, treating as no match");
                    Vec::new()
                }
                Err(e) => {
                    warn!(entity = %id, error = %e, "entity query failed, treating as no match");
                    Vec::new()
                }
            },
            (None, None) => Vec::new(),
        }
    }

    /// Whether any embodied candidate lies strictly within the threshold.
    pub fn is_met(&self, gateway: &dyn EntityGateway) -> bool {
        self.candidates(gateway).into_iter().any(|handle| {
            if !gateway.has_body(handle) {
                return false;
            }
            gateway
                .position(handle)
                .is_some_and(|position| position.distance(self.position) < self.threshold)
        })
    }
}

/// Variant-specific part of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKind {
    /// True iff every child is true. Vacuously true with no children.
    All(Vec<Condition>),
    /// True iff some child is true. False with no children.
    Any(Vec<Condition>),
    /// Entity proximity predicate.
    Entity(ProximityCondition),
    /// True iff the named timer exists and equals `value` exactly.
    Timer {
        /// Timer name.
        timer: String,
        /// Expected value.
        value: u64,
    },
}

/// A predicate together with the actions it triggers.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    kind: ConditionKind,
    once: bool,
    enabled: bool,
    actions: Vec<ActionId>,
}

impl Condition {
    /// Create an enabled, repeating condition with no actions.
    pub const fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            once: false,
            enabled: true,
            actions: Vec::new(),
        }
    }

    /// Conjunction of `children`.
    pub const fn all(children: Vec<Self>) -> Self {
        Self::new(ConditionKind::All(children))
    }

    /// Disjunction of `children`.
    pub const fn any(children: Vec<Self>) -> Self {
        Self::new(ConditionKind::Any(children))
    }

    /// Proximity predicate.
    pub const fn entity(proximity: ProximityCondition) -> Self {
        Self::new(ConditionKind::Entity(proximity))
    }

    /// Timer-equals-value predicate.
    pub fn timer(timer: impl Into<String>, value: u64) -> Self {
        Self::new(ConditionKind::Timer {
            timer: timer.into(),
            value,
        })
    }

    /// Set the fire-once flag.
    #[must_use]
    pub const fn fire_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    /// Append an action to the trigger list.
    #[must_use]
    pub fn triggers(mut self, action: ActionId) -> Self {
        self.actions.push(action);
        self
    }

    /// Replace the trigger list.
    #[must_use]
    pub fn with_actions(mut self, actions: Vec<ActionId>) -> Self {
        self.actions = actions;
        self
    }

    /// Variant data.
    pub const fn kind(&self) -> &ConditionKind {
        &self.kind
    }

    /// Whether this condition disables itself after the first trigger.
    pub const fn is_once(&self) -> bool {
        self.once
    }

    /// Whether the engine still drives this condition.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Actions to schedule when this condition triggers.
    pub fn actions(&self) -> &[ActionId] {
        &self.actions
    }

    /// Evaluate the predicate against the current state.
    pub fn evaluate(&self, ctx: &EvaluationContext<'_>) -> bool {
        match &self.kind {
            ConditionKind::All(children) => children.iter().all(|child| child.evaluate(ctx)),
            ConditionKind::Any(children) => children.iter().any(|child| child.evaluate(ctx)),
            ConditionKind::Entity(proximity) => proximity.is_met(ctx.gateway),
            ConditionKind::Timer { timer, value } => ctx.timers.get(timer) == Some(*value),
        }
    }

    /// Record that this condition triggered: fire-once conditions disable.
    pub const fn mark_triggered(&mut self) {
        if self.once {
            self.enabled = false;
        }
    }

    /// Re-enable this condition and all of its descendants.
    pub fn reset(&mut self) {
        self.enabled = true;
        if let ConditionKind::All(children) | ConditionKind::Any(children) = &mut self.kind {
            for child in children {
                child.reset();
            }
        }
    }

    /// Every action id referenced by this condition or its descendants.
    pub fn referenced_actions(&self) -> Vec<ActionId> {
        let mut ids = self.actions.clone();
        if let ConditionKind::All(children) | ConditionKind::Any(children) = &self.kind {
            for child in children {
                ids.extend(child.referenced_actions());
            }
        }
        ids
    }
}
