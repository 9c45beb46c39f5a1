//! Interpretation of entity template attributes.
//!
//! The scenario engine hands templates through untouched. This module is
//! where the arena decides what they mean:
//!
//! | attribute  | shape       | default                          |
//! |------------|-------------|----------------------------------|
//! | `id`       | string      | required                         |
//! | `position` | `[x, y, z]` | origin                           |
//! | `velocity` | `[x, y, z]` | at rest                          |
//! | `size`     | `[x, y, z]` | per-type default, else body-less |
//! | `body`     | bool        | `true`                           |
//!
//! Vectors are also accepted in the comma-separated `"x,y,z"` form.

use serde::de::DeserializeOwned;
use srocs_types::{EntityId, EntityTemplate, Vec3};

use crate::body::BoxBody;
use crate::error::WorldError;

/// Fully resolved description of an entity about to enter the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPlacement {
    /// Unique id.
    pub id: EntityId,
    /// Entity type name.
    pub entity_type: String,
    /// Origin anchor position.
    pub position: Vec3,
    /// Displacement applied on every arena advance.
    pub velocity: Vec3,
    /// Physical body, if the entity is embodied.
    pub body: Option<BoxBody>,
}

impl EntityPlacement {
    /// Resolve a template into a placement.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MissingAttribute`] when `id` is absent and
    /// [`WorldError::InvalidAttribute`] when an attribute has the wrong shape.
    pub fn from_template(template: &EntityTemplate) -> Result<Self, WorldError> {
        let id = match template.attribute("id") {
            Some(serde_json::Value::String(id)) if !id.is_empty() => EntityId::new(id.as_str()),
            Some(_) => {
                return Err(WorldError::InvalidAttribute {
                    attribute: "id",
                    reason: "expected a non-empty string".to_owned(),
                });
            }
            None => {
                return Err(WorldError::MissingAttribute {
                    entity_type: template.entity_type.clone(),
                    attribute: "id",
                });
            }
        };

        let position = vector_attribute(template, "position")?.unwrap_or(Vec3::ZERO);
        let velocity = vector_attribute(template, "velocity")?.unwrap_or(Vec3::ZERO);

        let embodied = typed_attribute::<bool>(template, "body")?.unwrap_or(true);
        let body = if embodied {
            match vector_attribute(template, "size")? {
                Some(size) => {
                    if size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0 {
                        return Err(WorldError::InvalidAttribute {
                            attribute: "size",
                            reason: format!("extents must be positive, got {size}"),
                        });
                    }
                    Some(BoxBody::new(size))
                }
                None => BoxBody::default_for(&template.entity_type),
            }
        } else {
            None
        };

        Ok(Self {
            id,
            entity_type: template.entity_type.clone(),
            position,
            velocity,
            body,
        })
    }
}

fn typed_attribute<T: DeserializeOwned>(
    template: &EntityTemplate,
    attribute: &'static str,
) -> Result<Option<T>, WorldError> {
    template
        .attribute(attribute)
        .map(|value| {
            serde_json::from_value::<T>(value.clone()).map_err(|e| WorldError::InvalidAttribute {
                attribute,
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn vector_attribute(
    template: &EntityTemplate,
    attribute: &'static str,
) -> Result<Option<Vec3>, WorldError> {
    let vector = match template.attribute(attribute) {
        Some(serde_json::Value::String(text)) => Some(parse_components(text).ok_or_else(|| {
            WorldError::InvalidAttribute {
                attribute,
                reason: format!("expected \"x,y,z\", got \"{text}\""),
            }
        })?),
        _ => typed_attribute::<Vec3>(template, attribute)?,
    };
    match vector {
        Some(v) if !v.is_finite() => Err(WorldError::InvalidAttribute {
            attribute,
            reason: format!("components must be finite, got {v}"),
        }),
        other => Ok(other),
    }
}

/// Comma-separated `"x,y,z"` form.
fn parse_components(text: &str) -> Option<Vec3> {
    let components = text
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    match components.as_slice() {
        &[x, y, z] => Some(Vec3::new(x, y, z)),
        _ => None,
    }
}
