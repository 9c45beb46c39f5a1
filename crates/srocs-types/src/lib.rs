//! Shared type definitions for the SRoCS scenario engine.
//!
//! These are the value types passed between the condition/action engine
//! and the Entity Gateway that fronts the physics simulation.
//!
//! # Modules
//!
//! - [`ids`] -- Configuration-level entity ids and gateway-issued handles
//! - [`geometry`] -- The [`Vec3`] point/vector type
//! - [`template`] -- [`EntityTemplate`], the opaque spawn descriptor

pub mod geometry;
pub mod ids;
pub mod template;

pub use geometry::Vec3;
pub use ids::{EntityHandle, EntityId};
pub use template::EntityTemplate;
