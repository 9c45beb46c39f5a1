//! Recursive-descent construction of the condition/action graph.
//!
//! Each descriptor node is validated before its variant is built: the
//! `type` discriminant must be known and every required attribute present
//! and well-formed. Any failure aborts construction with a [`BuildError`]
//! naming the offending node by path (`conditions[0].conditions[1]`).
//!
//! | condition `type` | attributes                                                     |
//! |------------------|----------------------------------------------------------------|
//! | `all`, `any`     | `conditions`                                                   |
//! | `entity`         | `entity_type`?, `entity_id`?, `position`, `threshold`          |
//! | `timer`          | `timer`, `value`                                               |
//!
//! | action `type`    | attributes                                |
//! |------------------|-------------------------------------------|
//! | `add_entity`     | `entity: { <entity_type>: { ... } }`      |
//! | `add_timer`      | `timer`                                   |
//! | `terminate`      |                                           |
//!
//! Conditions accept `once` (default `false`), actions accept `delay`
//! (default `0`). An empty `entity_type` or `entity_id` counts as unset.

use std::collections::BTreeMap;

use srocs_types::{EntityId, EntityTemplate, Vec3};
use tracing::warn;

use crate::action::{Action, ActionId, ActionKind};
use crate::condition::{Condition, ConditionKind, ProximityCondition};
use crate::descriptor::DescriptorNode;
use crate::graph::{GraphError, ScenarioGraph};

/// Errors raised while building the graph from descriptors.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BuildError {
    /// The condition `type` is not one of `all|any|entity|timer`.
    #[error("{node}: unknown condition type `{kind}`")]
    UnknownConditionType {
        /// Path of the node.
        node: String,
        /// The unrecognised discriminant.
        kind: String,
    },

    /// The action `type` is not one of `add_entity|add_timer|terminate`.
    #[error("{node}: unknown action type `{kind}`")]
    UnknownActionType {
        /// Path of the node.
        node: String,
        /// The unrecognised discriminant.
        kind: String,
    },

    /// A required attribute is absent.
    #[error("{node}: missing required attribute `{field}`")]
    MissingField {
        /// Path of the node.
        node: String,
        /// Attribute name.
        field: &'static str,
    },

    /// An attribute is present but malformed.
    #[error("{node}: invalid attribute `{field}`: {reason}")]
    InvalidField {
        /// Path of the node.
        node: String,
        /// Attribute name.
        field: &'static str,
        /// Explanation of what is wrong.
        reason: String,
    },

    /// An `add_entity` action carries no entity.
    #[error("{node}: entity descriptor is empty")]
    EmptyEntityTemplate {
        /// Path of the node.
        node: String,
    },

    /// The assembled graph is inconsistent.
    #[error("graph error: {source}")]
    Graph {
        /// The underlying graph error.
        #[from]
        source: GraphError,
    },
}

/// Build the graph for a list of top-level condition descriptors.
///
/// Actions are added to the arena in declaration order, depth first.
///
/// # Errors
///
/// Returns the first [`BuildError`] encountered.
pub fn build_graph(nodes: &[DescriptorNode]) -> Result<ScenarioGraph, BuildError> {
    let mut graph = ScenarioGraph::new();
    for (index, node) in nodes.iter().enumerate() {
        let path = format!("conditions[{index}]");
        let condition = build_condition(&mut graph, node, &path, true)?;
        graph.add_condition(condition);
    }
    graph.validate()?;
    Ok(graph)
}

fn build_condition(
    graph: &mut ScenarioGraph,
    node: &DescriptorNode,
    path: &str,
    top_level: bool,
) -> Result<Condition, BuildError> {
    let kind = required_str(node, path, "type")?;
    let once = optional_bool(node, path, "once")?.unwrap_or(false);

    let condition_kind = match kind {
        "all" | "any" => {
            let children = node
                .conditions
                .iter()
                .enumerate()
                .map(|(index, child)| {
                    build_condition(graph, child, &format!("{path}.conditions[{index}]"), false)
                })
                .collect::<Result<Vec<_>, _>>()?;
            if kind == "all" {
                ConditionKind::All(children)
            } else {
                ConditionKind::Any(children)
            }
        }
        "entity" => ConditionKind::Entity(proximity(node, path)?),
        "timer" => ConditionKind::Timer {
            timer: required_str(node, path, "timer")?.to_owned(),
            value: required_u64(node, path, "value")?,
        },
        other => {
            return Err(BuildError::UnknownConditionType {
                node: path.to_owned(),
                kind: other.to_owned(),
            });
        }
    };

    if !matches!(condition_kind, ConditionKind::All(_) | ConditionKind::Any(_))
        && !node.conditions.is_empty()
    {
        return Err(BuildError::InvalidField {
            node: path.to_owned(),
            field: "conditions",
            reason: format!("`{kind}` conditions take no child conditions"),
        });
    }

    let actions = node
        .actions
        .iter()
        .enumerate()
        .map(|(index, action)| {
            let action = build_action(action, &format!("{path}.actions[{index}]"))?;
            Ok(graph.add_action(action))
        })
        .collect::<Result<Vec<ActionId>, BuildError>>()?;

    if !top_level && !actions.is_empty() {
        warn!(node = path, "actions on a nested condition are never triggered");
    }

    Ok(Condition::new(condition_kind)
        .fire_once(once)
        .with_actions(actions))
}

fn proximity(node: &DescriptorNode, path: &str) -> Result<ProximityCondition, BuildError> {
    // An empty filter is the same as an absent one.
    let entity_type = optional_str(node, path, "entity_type")?
        .filter(|name| !name.is_empty())
        .map(str::to_owned);
    let entity_id = optional_str(node, path, "entity_id")?
        .filter(|id| !id.is_empty())
        .map(EntityId::new);
    if entity_type.is_none() && entity_id.is_none() {
        return Err(BuildError::MissingField {
            node: path.to_owned(),
            field: "entity_id",
        });
    }

    let position = vector(node, path, "position")?;
    let threshold = required_f64(node, path, "threshold")?;
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(BuildError::InvalidField {
            node: path.to_owned(),
            field: "threshold",
            reason: format!("expected a non-negative distance, got {threshold}"),
        });
    }

    Ok(ProximityCondition {
        entity_type,
        entity_id,
        position,
        threshold,
    })
}

fn build_action(node: &DescriptorNode, path: &str) -> Result<Action, BuildError> {
    let kind = required_str(node, path, "type")?;
    let delay = optional_u64(node, path, "delay")?.unwrap_or(0);

    if !node.conditions.is_empty() || !node.actions.is_empty() {
        return Err(BuildError::InvalidField {
            node: path.to_owned(),
            field: "actions",
            reason: "actions take no child nodes".to_owned(),
        });
    }

    let action_kind = match kind {
        "add_entity" => {
            let entity = node.attribute("entity").ok_or_else(|| BuildError::MissingField {
                node: path.to_owned(),
                field: "entity",
            })?;
            ActionKind::AddEntity(entity_template(entity, path)?)
        }
        "add_timer" => ActionKind::AddTimer {
            timer: required_str(node, path, "timer")?.to_owned(),
        },
        "terminate" => ActionKind::Terminate,
        other => {
            return Err(BuildError::UnknownActionType {
                node: path.to_owned(),
                kind: other.to_owned(),
            });
        }
    };
    Ok(Action::new(delay, action_kind))
}

/// Convert an entity descriptor (`{ <entity_type>: { attributes } }`) into a
/// template.
///
/// # Errors
///
/// Returns [`BuildError::EmptyEntityTemplate`] for an empty or null
/// descriptor and [`BuildError::InvalidField`] for anything that is not a
/// single-key mapping of string-keyed attributes.
pub fn entity_template(value: &serde_yml::Value, path: &str) -> Result<EntityTemplate, BuildError> {
    let invalid = |reason: String| BuildError::InvalidField {
        node: path.to_owned(),
        field: "entity",
        reason,
    };

    let mapping = match value {
        serde_yml::Value::Null => {
            return Err(BuildError::EmptyEntityTemplate {
                node: path.to_owned(),
            });
        }
        serde_yml::Value::Mapping(mapping) => mapping,
        _ => return Err(invalid("expected a mapping from entity type to attributes".to_owned())),
    };

    let mut entries = mapping.iter();
    let Some((entity_type, body)) = entries.next() else {
        return Err(BuildError::EmptyEntityTemplate {
            node: path.to_owned(),
        });
    };
    if entries.next().is_some() {
        return Err(invalid(format!(
            "expected exactly one entity, found {}",
            mapping.len()
        )));
    }
    let Some(entity_type) = entity_type.as_str().filter(|name| !name.is_empty()) else {
        return Err(invalid("entity type must be a non-empty string".to_owned()));
    };

    let attributes = match body {
        serde_yml::Value::Null => BTreeMap::new(),
        serde_yml::Value::Mapping(_) => serde_json::to_value(body)
            .and_then(serde_json::from_value::<BTreeMap<String, serde_json::Value>>)
            .map_err(|e| invalid(e.to_string()))?,
        _ => return Err(invalid(format!("attributes of `{entity_type}` must be a mapping"))),
    };

    Ok(EntityTemplate {
        entity_type: entity_type.to_owned(),
        attributes,
    })
}

// ---------------------------------------------------------------------------
// Attribute accessors
// ---------------------------------------------------------------------------

fn missing(path: &str, field: &'static str) -> BuildError {
    BuildError::MissingField {
        node: path.to_owned(),
        field,
    }
}

fn invalid_type(path: &str, field: &'static str, expected: &str) -> BuildError {
    BuildError::InvalidField {
        node: path.to_owned(),
        field,
        reason: format!("expected {expected}"),
    }
}

fn optional_str<'a>(
    node: &'a DescriptorNode,
    path: &str,
    field: &'static str,
) -> Result<Option<&'a str>, BuildError> {
    node.attribute(field)
        .map(|value| value.as_str().ok_or_else(|| invalid_type(path, field, "a string")))
        .transpose()
}

fn required_str<'a>(
    node: &'a DescriptorNode,
    path: &str,
    field: &'static str,
) -> Result<&'a str, BuildError> {
    optional_str(node, path, field)?.ok_or_else(|| missing(path, field))
}

fn optional_bool(
    node: &DescriptorNode,
    path: &str,
    field: &'static str,
) -> Result<Option<bool>, BuildError> {
    node.attribute(field)
        .map(|value| match value {
            serde_yml::Value::Bool(flag) => Ok(*flag),
            serde_yml::Value::String(text) if text == "true" => Ok(true),
            serde_yml::Value::String(text) if text == "false" => Ok(false),
            _ => Err(invalid_type(path, field, "a boolean")),
        })
        .transpose()
}

fn optional_u64(
    node: &DescriptorNode,
    path: &str,
    field: &'static str,
) -> Result<Option<u64>, BuildError> {
    node.attribute(field)
        .map(|value| {
            value
                .as_u64()
                .ok_or_else(|| invalid_type(path, field, "a non-negative integer"))
        })
        .transpose()
}

fn required_u64(node: &DescriptorNode, path: &str, field: &'static str) -> Result<u64, BuildError> {
    optional_u64(node, path, field)?.ok_or_else(|| missing(path, field))
}

fn required_f64(node: &DescriptorNode, path: &str, field: &'static str) -> Result<f64, BuildError> {
    node.attribute(field)
        .ok_or_else(|| missing(path, field))?
        .as_f64()
        .ok_or_else(|| invalid_type(path, field, "a number"))
}

/// Accepts `[x, y, z]` or the comma-separated `"x,y,z"` form.
fn vector(node: &DescriptorNode, path: &str, field: &'static str) -> Result<Vec3, BuildError> {
    let value = node.attribute(field).ok_or_else(|| missing(path, field))?;
    let parsed = match value {
        serde_yml::Value::String(text) => {
            let components = text
                .split(',')
                .map(|part| part.trim().parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .ok();
            match components.as_deref() {
                Some(&[x, y, z]) => Some(Vec3::new(x, y, z)),
                _ => None,
            }
        }
        other => serde_yml::from_value::<Vec3>(other.clone()).ok(),
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid_type(path, field, "three finite numbers"))
}
