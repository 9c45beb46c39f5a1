//! Arena of embodied entities for the SRoCS scenario engine.
//!
//! This crate is the reference world the scenario engine runs against when
//! no external physics simulator is attached. It keeps a flat table of
//! entities, each optionally carrying an axis-aligned box body, and answers
//! the placement, query and overlap questions the engine asks.
//!
//! # Modules
//!
//! - [`arena`] -- [`Arena`], the entity table with spawn/remove/query.
//! - [`body`] -- [`BoxBody`] and the overlap test.
//! - [`error`] -- Error types for arena operations.
//! - [`placement`] -- Interpretation of [`EntityTemplate`] attributes.
//!
//! [`EntityTemplate`]: srocs_types::EntityTemplate

pub mod arena;
pub mod body;
pub mod error;
pub mod placement;

pub use arena::{Arena, EntityRecord};
pub use body::BoxBody;
pub use error::WorldError;
pub use placement::EntityPlacement;
