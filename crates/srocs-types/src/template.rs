//! Spawn descriptors for entities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Descriptor from which the Entity Gateway builds a new entity.
///
/// The engine treats the attributes as opaque and passes them through
/// untouched; only the gateway knows what `position`, `size` and friends
/// mean for a given entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTemplate {
    /// Entity type name (e.g. `block`, `builderbot`).
    pub entity_type: String,
    /// Type-specific attributes, interpreted by the gateway.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl EntityTemplate {
    /// Create a template with no attributes.
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    /// The `id` attribute, when present and a string.
    pub fn id(&self) -> Option<&str> {
        self.attribute("id").and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_attributes() {
        let template = EntityTemplate::new("block")
            .with("id", "block1")
            .with("position", serde_json::json!([0.0, 1.0, 0.0]));
        assert_eq!(template.entity_type, "block");
        assert_eq!(template.id(), Some("block1"));
        assert!(template.attribute("position").is_some());
        assert!(template.attribute("size").is_none());
    }

    #[test]
    fn non_string_id_is_ignored() {
        let template = EntityTemplate::new("block").with("id", 7);
        assert_eq!(template.id(), None);
    }
}
