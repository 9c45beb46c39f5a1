//! Descriptor nodes: the configuration shape of conditions and actions.
//!
//! A node is a YAML mapping. Its `conditions` and `actions` keys hold child
//! nodes; every other key is a plain attribute (`type`, `once`, `delay`,
//! `timer`, ...). The builder decides which attributes each node type
//! requires.
//!
//! ```yaml
//! - type: timer
//!   timer: t1
//!   value: 3
//!   once: true
//!   actions:
//!     - type: terminate
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

/// One condition or action node of the descriptor tree.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DescriptorNode {
    /// Child condition nodes (combinators only).
    #[serde(default)]
    pub conditions: Vec<DescriptorNode>,

    /// Action nodes triggered by this condition.
    #[serde(default)]
    pub actions: Vec<DescriptorNode>,

    /// All remaining keys.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_yml::Value>,
}

impl DescriptorNode {
    /// Look up a raw attribute.
    pub fn attribute(&self, key: &str) -> Option<&serde_yml::Value> {
        self.attributes.get(key)
    }

    /// Builder-style attribute setter, for assembling nodes in code.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<serde_yml::Value>) -> Self {
        self.attributes.insert(key.to_owned(), value.into());
        self
    }

    /// Builder-style child condition.
    #[must_use]
    pub fn with_condition(mut self, child: Self) -> Self {
        self.conditions.push(child);
        self
    }

    /// Builder-style action.
    #[must_use]
    pub fn with_action(mut self, action: Self) -> Self {
        self.actions.push(action);
        self
    }

    /// Parse a YAML sequence of nodes.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the text is not a sequence of mappings.
    pub fn parse_list(yaml: &str) -> Result<Vec<Self>, serde_yml::Error> {
        serde_yml::from_str(yaml)
    }
}
