//! Identifier types for simulated entities.
//!
//! Entities carry two identities. [`EntityId`] is the human-chosen id from
//! the scenario file (`block7`, `builderbot0`) and is what conditions refer
//! to. [`EntityHandle`] is issued by the Entity Gateway when an entity is
//! inserted into the world and is only meaningful to that gateway.

use serde::{Deserialize, Serialize};

/// Configuration-level identifier of an entity (e.g. `"block0"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Create an identifier from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Opaque handle to an entity living in the gateway's world.
///
/// Handles are never reused by a gateway within one run, so a stale handle
/// resolves to nothing rather than to a different entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityHandle(pub u64);

impl EntityHandle {
    /// Return the raw handle value.
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_serializes_as_plain_string() {
        let id = EntityId::new("block3");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"block3\""));
    }

    #[test]
    fn entity_id_display_matches_inner() {
        let id = EntityId::from("builderbot0");
        assert_eq!(id.to_string(), "builderbot0");
        assert_eq!(id.as_str(), "builderbot0");
    }

    #[test]
    fn handle_display() {
        assert_eq!(EntityHandle(12).to_string(), "#12");
    }
}
