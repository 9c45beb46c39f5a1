//! The arena: a flat table of entities with optional box bodies.
//!
//! Entities are keyed by gateway-issued [`EntityHandle`]s, which increase
//! monotonically and are never reused. Iteration is in handle order, i.e.
//! insertion order, so every query is deterministic.

use std::collections::BTreeMap;

use srocs_types::{EntityHandle, EntityId, EntityTemplate, Vec3};
use tracing::debug;

use crate::body::BoxBody;
use crate::error::WorldError;
use crate::placement::EntityPlacement;

/// A single entity present in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    /// Unique id.
    pub id: EntityId,
    /// Entity type name.
    pub entity_type: String,
    /// Origin anchor position.
    pub position: Vec3,
    /// Displacement applied on every [`Arena::advance`].
    pub velocity: Vec3,
    /// Physical body, if any.
    pub body: Option<BoxBody>,
    /// Free-form debug text attached by controllers or operators.
    pub annotation: String,
}

/// The world the scenario engine operates on.
#[derive(Debug, Clone)]
pub struct Arena {
    entities: BTreeMap<EntityHandle, EntityRecord>,
    by_id: BTreeMap<EntityId, EntityHandle>,
    next_handle: Option<u64>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    /// Create an empty arena.
    pub const fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            by_id: BTreeMap::new(),
            next_handle: Some(0),
        }
    }

    /// Build an entity from a template and insert it.
    ///
    /// The entity is inserted even if it overlaps another body; callers
    /// that care ask [`Arena::is_colliding`] afterwards.
    ///
    /// # Errors
    ///
    /// Propagates template interpretation errors and returns
    /// [`WorldError::DuplicateEntity`] if the id is taken.
    pub fn spawn(&mut self, template: &EntityTemplate) -> Result<EntityHandle, WorldError> {
        let placement = EntityPlacement::from_template(template)?;
        self.insert(placement)
    }

    /// Insert an already resolved entity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateEntity`] if the id is taken, or
    /// [`WorldError::HandlesExhausted`] if no handle is left.
    pub fn insert(&mut self, placement: EntityPlacement) -> Result<EntityHandle, WorldError> {
        if self.by_id.contains_key(&placement.id) {
            return Err(WorldError::DuplicateEntity(placement.id));
        }
        let next = self.next_handle.ok_or(WorldError::HandlesExhausted)?;
        let handle = EntityHandle(next);
        self.next_handle = next.checked_add(1);

        debug!(
            entity = %placement.id,
            entity_type = placement.entity_type,
            handle = %handle,
            position = %placement.position,
            embodied = placement.body.is_some(),
            "entity added to arena"
        );
        self.by_id.insert(placement.id.clone(), handle);
        self.entities.insert(
            handle,
            EntityRecord {
                id: placement.id,
                entity_type: placement.entity_type,
                position: placement.position,
                velocity: placement.velocity,
                body: placement.body,
                annotation: String::new(),
            },
        );
        Ok(handle)
    }

    /// Remove an entity, returning its record.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::HandleNotFound`] if the handle is unknown.
    pub fn remove(&mut self, handle: EntityHandle) -> Result<EntityRecord, WorldError> {
        let record = self
            .entities
            .remove(&handle)
            .ok_or(WorldError::HandleNotFound(handle))?;
        self.by_id.remove(&record.id);
        debug!(entity = %record.id, handle = %handle, "entity removed from arena");
        Ok(record)
    }

    /// Look up an entity record.
    pub fn get(&self, handle: EntityHandle) -> Option<&EntityRecord> {
        self.entities.get(&handle)
    }

    /// Resolve an entity id to its handle.
    pub fn find(&self, id: &EntityId) -> Option<EntityHandle> {
        self.by_id.get(id).copied()
    }

    /// All entities of the given type, in insertion order.
    pub fn of_type(&self, entity_type: &str) -> Vec<EntityHandle> {
        self.entities
            .iter()
            .filter(|(_, record)| record.entity_type == entity_type)
            .map(|(&handle, _)| handle)
            .collect()
    }

    /// Every other embodied entity whose body overlaps this one.
    ///
    /// Body-less entities never collide with anything.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::HandleNotFound`] if the handle is unknown.
    pub fn colliding_with(&self, handle: EntityHandle) -> Result<Vec<EntityHandle>, WorldError> {
        let record = self.get(handle).ok_or(WorldError::HandleNotFound(handle))?;
        let Some(body) = record.body else {
            return Ok(Vec::new());
        };
        Ok(self
            .entities
            .iter()
            .filter(|&(&other, _)| other != handle)
            .filter_map(|(&other, other_record)| {
                other_record
                    .body
                    .filter(|other_body| {
                        body.overlaps(record.position, other_body, other_record.position)
                    })
                    .map(|_| other)
            })
            .collect())
    }

    /// Whether this entity's body overlaps any other body.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::HandleNotFound`] if the handle is unknown.
    pub fn is_colliding(&self, handle: EntityHandle) -> Result<bool, WorldError> {
        self.colliding_with(handle).map(|others| !others.is_empty())
    }

    /// Teleport an entity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::HandleNotFound`] if the handle is unknown.
    pub fn move_to(&mut self, handle: EntityHandle, position: Vec3) -> Result<(), WorldError> {
        let record = self
            .entities
            .get_mut(&handle)
            .ok_or(WorldError::HandleNotFound(handle))?;
        record.position = position;
        Ok(())
    }

    /// Change an entity's per-tick displacement.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::HandleNotFound`] if the handle is unknown.
    pub fn set_velocity(&mut self, handle: EntityHandle, velocity: Vec3) -> Result<(), WorldError> {
        let record = self
            .entities
            .get_mut(&handle)
            .ok_or(WorldError::HandleNotFound(handle))?;
        record.velocity = velocity;
        Ok(())
    }

    /// Attach free-form debug text to an entity, replacing any previous text.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::HandleNotFound`] if the handle is unknown.
    pub fn annotate(
        &mut self,
        handle: EntityHandle,
        text: impl Into<String>,
    ) -> Result<(), WorldError> {
        let record = self
            .entities
            .get_mut(&handle)
            .ok_or(WorldError::HandleNotFound(handle))?;
        record.annotation = text.into();
        Ok(())
    }

    /// Move every entity by its velocity. Called once per tick.
    pub fn advance(&mut self) {
        for record in self.entities.values_mut() {
            record.position = record.position.offset(record.velocity);
        }
    }

    /// Number of entities present.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over all entities in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &EntityRecord)> {
        self.entities.iter().map(|(&handle, record)| (handle, record))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn block(id: &str, x: f64, y: f64) -> EntityTemplate {
        EntityTemplate::new("block")
            .with("id", id)
            .with("position", json!([x, y, 0.0]))
    }

    #[test]
    fn spawn_and_find() {
        let mut arena = Arena::new();
        let handle = arena.spawn(&block("block0", 0.0, 0.0)).unwrap();
        assert_eq!(arena.find(&EntityId::from("block0")), Some(handle));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(handle).unwrap().entity_type, "block");
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut arena = Arena::new();
        arena.spawn(&block("block0", 0.0, 0.0)).unwrap();
        let result = arena.spawn(&block("block0", 1.0, 1.0));
        assert!(matches!(result, Err(WorldError::DuplicateEntity(_))));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn handles_are_not_reused() {
        let mut arena = Arena::new();
        let first = arena.spawn(&block("a", 0.0, 0.0)).unwrap();
        arena.remove(first).unwrap();
        let second = arena.spawn(&block("a", 0.0, 0.0)).unwrap();
        assert_ne!(first, second);
        assert!(arena.get(first).is_none());
    }

    #[test]
    fn last_handle_is_usable_then_exhausted() {
        let mut arena = Arena::new();
        arena.next_handle = Some(u64::MAX);
        let last = arena.spawn(&block("last", 0.0, 0.0)).unwrap();
        assert_eq!(last, EntityHandle(u64::MAX));
        assert!(matches!(
            arena.spawn(&block("extra", 1.0, 0.0)),
            Err(WorldError::HandlesExhausted)
        ));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn default_arena_accepts_entities() {
        let mut arena = Arena::default();
        assert_eq!(arena.spawn(&block("a", 0.0, 0.0)).unwrap(), EntityHandle(0));
    }

    #[test]
    fn of_type_is_in_insertion_order() {
        let mut arena = Arena::new();
        let a = arena.spawn(&block("a", 0.0, 0.0)).unwrap();
        let _robot = arena
            .spawn(&EntityTemplate::new("builderbot").with("id", "r"))
            .unwrap();
        let b = arena.spawn(&block("b", 1.0, 0.0)).unwrap();
        assert_eq!(arena.of_type("block"), vec![a, b]);
        assert!(arena.of_type("light").is_empty());
    }

    #[test]
    fn overlapping_blocks_collide() {
        let mut arena = Arena::new();
        let a = arena.spawn(&block("a", 0.0, 0.0)).unwrap();
        let b = arena.spawn(&block("b", 0.01, 0.0)).unwrap();
        let c = arena.spawn(&block("c", 1.0, 0.0)).unwrap();
        assert!(arena.is_colliding(a).unwrap());
        assert_eq!(arena.colliding_with(b).unwrap(), vec![a]);
        assert!(!arena.is_colliding(c).unwrap());
    }

    #[test]
    fn bodyless_entities_never_collide() {
        let mut arena = Arena::new();
        let a = arena.spawn(&block("a", 0.0, 0.0)).unwrap();
        let ghost = arena
            .spawn(&block("ghost", 0.0, 0.0).with("body", false))
            .unwrap();
        assert!(!arena.is_colliding(ghost).unwrap());
        assert!(!arena.is_colliding(a).unwrap());
    }

    #[test]
    fn advance_applies_velocity() {
        let mut arena = Arena::new();
        let handle = arena
            .spawn(&block("mover", 0.0, 0.0).with("velocity", json!([0.1, 0.0, 0.0])))
            .unwrap();
        arena.advance();
        arena.advance();
        let position = arena.get(handle).unwrap().position;
        assert!((position.x - 0.2).abs() < 1e-9);
    }

    #[test]
    fn unknown_handle_errors() {
        let mut arena = Arena::new();
        assert!(arena.remove(EntityHandle(99)).is_err());
        assert!(arena.is_colliding(EntityHandle(99)).is_err());
        assert!(arena.move_to(EntityHandle(99), Vec3::ZERO).is_err());
        assert!(arena.annotate(EntityHandle(99), "x").is_err());
    }
}
