//! Error types for the `srocs-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`].

use srocs_types::{EntityHandle, EntityId};

/// Errors that can occur during arena operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// No entity with this handle is present in the arena.
    #[error("entity not found: {0}")]
    HandleNotFound(EntityHandle),

    /// An entity with the same id already exists.
    #[error("duplicate entity id: {0}")]
    DuplicateEntity(EntityId),

    /// The template lacks an attribute the arena needs.
    #[error("entity template for {entity_type} is missing attribute `{attribute}`")]
    MissingAttribute {
        /// Entity type named by the template.
        entity_type: String,
        /// Attribute name.
        attribute: &'static str,
    },

    /// A template attribute has the wrong shape.
    #[error("entity template attribute `{attribute}` is invalid: {reason}")]
    InvalidAttribute {
        /// Attribute name.
        attribute: &'static str,
        /// Explanation of what is wrong.
        reason: String,
    },

    /// The handle counter ran out.
    #[error("entity handle space exhausted")]
    HandlesExhausted,
}
