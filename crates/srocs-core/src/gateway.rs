//! The Entity Gateway seam between the scenario engine and the simulator.
//!
//! The engine never touches the physics world directly. Everything it
//! needs (placing entities, querying them, testing bodies for overlap) goes
//! through [`EntityGateway`], so the engine can run against the in-memory
//! [`Arena`] as easily as against an external simulator.
//!
//! All calls are synchronous and immediately consistent: an entity returned
//! by [`EntityGateway::spawn`] is visible to [`EntityGateway::is_colliding`]
//! straight away.

use srocs_types::{EntityHandle, EntityId, EntityTemplate, Vec3};
use srocs_world::{Arena, WorldError};

/// Errors surfaced by an Entity Gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The handle does not refer to a live entity.
    #[error("unknown entity handle {0}")]
    UnknownHandle(EntityHandle),

    /// The simulator refused to build or place the entity.
    #[error("spawn rejected: {reason}")]
    SpawnRejected {
        /// Explanation from the simulator.
        reason: String,
    },

    /// A query could not be answered.
    #[error("query failed: {reason}")]
    QueryFailed {
        /// Explanation from the simulator.
        reason: String,
    },
}

impl From<WorldError> for GatewayError {
    fn from(error: WorldError) -> Self {
        match error {
            WorldError::HandleNotFound(handle) => Self::UnknownHandle(handle),
            other => Self::SpawnRejected {
                reason: other.to_string(),
            },
        }
    }
}

/// Services the scenario engine consumes from the simulator.
pub trait EntityGateway {
    /// All entities of the given type.
    fn entities_by_type(&self, entity_type: &str) -> Result<Vec<EntityHandle>, GatewayError>;

    /// The entity with this id, if any.
    fn entity_by_id(&self, id: &EntityId) -> Result<Option<EntityHandle>, GatewayError>;

    /// Configuration-level id of a live entity.
    fn entity_id(&self, handle: EntityHandle) -> Option<EntityId>;

    /// World position of the entity's body origin.
    fn position(&self, handle: EntityHandle) -> Option<Vec3>;

    /// Whether the entity has a physical body.
    fn has_body(&self, handle: EntityHandle) -> bool;

    /// Construct, initialise and insert an entity.
    fn spawn(&mut self, template: &EntityTemplate) -> Result<EntityHandle, GatewayError>;

    /// Remove an entity from the world.
    fn remove(&mut self, handle: EntityHandle) -> Result<(), GatewayError>;

    /// Whether the entity's body overlaps any other body.
    fn is_colliding(&self, handle: EntityHandle) -> Result<bool, GatewayError>;

    /// Free-form debug text attached to the entity, used for per-entity logs.
    fn annotation(&self, _handle: EntityHandle) -> Option<String> {
        None
    }
}

impl EntityGateway for Arena {
    fn entities_by_type(&self, entity_type: &str) -> Result<Vec<EntityHandle>, GatewayError> {
        Ok(self.of_type(entity_type))
    }

    fn entity_by_id(&self, id: &EntityId) -> Result<Option<EntityHandle>, GatewayError> {
        Ok(self.find(id))
    }

    fn entity_id(&self, handle: EntityHandle) -> Option<EntityId> {
        self.get(handle).map(|record| record.id.clone())
    }

    fn position(&self, handle: EntityHandle) -> Option<Vec3> {
        self.get(handle).map(|record| record.position)
    }

    fn has_body(&self, handle: EntityHandle) -> bool {
        self.get(handle).is_some_and(|record| record.body.is_some())
    }

    fn spawn(&mut self, template: &EntityTemplate) -> Result<EntityHandle, GatewayError> {
        Ok(Self::spawn(self, template)?)
    }

    fn remove(&mut self, handle: EntityHandle) -> Result<(), GatewayError> {
        Self::remove(self, handle)?;
        Ok(())
    }

    fn is_colliding(&self, handle: EntityHandle) -> Result<bool, GatewayError> {
        Ok(Self::is_colliding(self, handle)?)
    }

    fn annotation(&self, handle: EntityHandle) -> Option<String> {
        self.get(handle)
            .map(|record| record.annotation.clone())
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn arena_gateway_round_trip() {
        let mut arena = Arena::new();
        let gateway: &mut dyn EntityGateway = &mut arena;
        let template = EntityTemplate::new("block")
            .with("id", "block0")
            .with("position", json!([0.5, 0.0, 0.0]));
        let handle = gateway.spawn(&template).unwrap();

        assert_eq!(gateway.entity_by_id(&EntityId::from("block0")).unwrap(), Some(handle));
        assert_eq!(gateway.entities_by_type("block").unwrap(), vec![handle]);
        assert_eq!(gateway.entity_id(handle), Some(EntityId::from("block0")));
        assert!(gateway.has_body(handle));
        assert!(!gateway.is_colliding(handle).unwrap());
        assert!((gateway.position(handle).unwrap().x - 0.5).abs() < 1e-12);

        gateway.remove(handle).unwrap();
        assert_eq!(gateway.entity_by_id(&EntityId::from("block0")).unwrap(), None);
        assert!(matches!(
            gateway.remove(handle),
            Err(GatewayError::UnknownHandle(_))
        ));
    }

    #[test]
    fn world_errors_map_to_spawn_rejected() {
        let mut arena = Arena::new();
        let template = EntityTemplate::new("block").with("id", "dup");
        EntityGateway::spawn(&mut arena, &template).unwrap();
        assert!(matches!(
            EntityGateway::spawn(&mut arena, &template),
            Err(GatewayError::SpawnRejected { .. })
        ));
    }

    #[test]
    fn empty_annotation_reads_as_none() {
        let mut arena = Arena::new();
        let handle =
            Arena::spawn(&mut arena, &EntityTemplate::new("block").with("id", "b")).unwrap();
        assert_eq!(EntityGateway::annotation(&arena, handle), None);
        arena.annotate(handle, "carrying").unwrap();
        assert_eq!(EntityGateway::annotation(&arena, handle).as_deref(), Some("carrying"));
    }
}
