//! The condition/action graph handed to the engine.
//!
//! A [`ScenarioGraph`] holds the action arena and the ordered list of
//! top-level conditions. It is normally produced from scenario descriptors
//! by [`crate::builder`], but can be assembled by hand.

use crate::action::{Action, ActionId};
use crate::condition::Condition;

/// Structural problems in a hand-assembled graph.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GraphError {
    /// A condition references an action that is not in the arena.
    #[error("condition {condition} references unknown action {}", action.0)]
    UnknownAction {
        /// Index of the top-level condition containing the reference.
        condition: usize,
        /// The dangling action id.
        action: ActionId,
    },
}

/// Action arena plus top-level conditions, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioGraph {
    actions: Vec<Action>,
    conditions: Vec<Condition>,
}

impl ScenarioGraph {
    /// Create an empty graph.
    pub const fn new() -> Self {
        Self {
            actions: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Add an action to the arena and return its id.
    ///
    /// The id may be placed in any number of trigger lists.
    pub fn add_action(&mut self, action: Action) -> ActionId {
        let id = ActionId(self.actions.len());
        self.actions.push(action);
        id
    }

    /// Append a top-level condition and return its index.
    pub fn add_condition(&mut self, condition: Condition) -> usize {
        let index = self.conditions.len();
        self.conditions.push(condition);
        index
    }

    /// Look up an action.
    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(id.0)
    }

    /// The action arena.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// The top-level conditions.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Check that every referenced action exists.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownAction`] for the first dangling reference.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (index, condition) in self.conditions.iter().enumerate() {
            if let Some(action) = condition
                .referenced_actions()
                .into_iter()
                .find(|id| self.action(*id).is_none())
            {
                return Err(GraphError::UnknownAction {
                    condition: index,
                    action,
                });
            }
        }
        Ok(())
    }

    /// Split into the action arena and the conditions.
    pub fn into_parts(self) -> (Vec<Action>, Vec<Condition>) {
        (self.actions, self.conditions)
    }
}
