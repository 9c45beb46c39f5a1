//! Axis-aligned box bodies.

use serde::{Deserialize, Serialize};
use srocs_types::Vec3;

/// Edge length of a stigmergic building block, in metres.
pub const BLOCK_SIDE_LENGTH: f64 = 0.055;

/// Footprint edge of a `BuilderBot`, in metres.
pub const BUILDERBOT_SIDE_LENGTH: f64 = 0.2;

/// Axis-aligned box whose origin anchor sits at the centre of its base.
///
/// This mirrors how embodied entities are placed in the arena: the
/// `position` of an entity is the point it stands on, and the box extends
/// `size.z` upwards from there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxBody {
    /// Full extents of the box along each axis.
    pub size: Vec3,
}

impl BoxBody {
    /// Create a box with the given extents.
    pub const fn new(size: Vec3) -> Self {
        Self { size }
    }

    /// Create a cube with the given edge length.
    pub const fn cube(side: f64) -> Self {
        Self::new(Vec3::new(side, side, side))
    }

    /// Default body for a known entity type, if that type is embodied.
    pub fn default_for(entity_type: &str) -> Option<Self> {
        match entity_type {
            "block" => Some(Self::cube(BLOCK_SIDE_LENGTH)),
            "builderbot" => Some(Self::cube(BUILDERBOT_SIDE_LENGTH)),
            _ => None,
        }
    }

    /// Minimum and maximum corners when the origin anchor is at `origin`.
    pub fn bounds(&self, origin: Vec3) -> (Vec3, Vec3) {
        let half_x = self.size.x * 0.5;
        let half_y = self.size.y * 0.5;
        (
            Vec3::new(origin.x - half_x, origin.y - half_y, origin.z),
            Vec3::new(origin.x + half_x, origin.y + half_y, origin.z + self.size.z),
        )
    }

    /// Whether two placed boxes overlap with non-zero volume.
    ///
    /// Boxes that merely touch along a face, edge or corner do not overlap.
    pub fn overlaps(&self, origin: Vec3, other: &Self, other_origin: Vec3) -> bool {
        let (a_min, a_max) = self.bounds(origin);
        let (b_min, b_max) = other.bounds(other_origin);
        a_min.x < b_max.x
            && b_min.x < a_max.x
            && a_min.y < b_max.y
            && b_min.y < a_max.y
            && a_min.z < b_max.z
            && b_min.z < a_max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coincident_blocks_overlap() {
        let block = BoxBody::cube(BLOCK_SIDE_LENGTH);
        let p = Vec3::new(0.3, 0.3, 0.0);
        assert!(block.overlaps(p, &block, p));
    }

    #[test]
    fn touching_faces_do_not_overlap() {
        let block = BoxBody::cube(0.1);
        assert!(!block.overlaps(Vec3::ZERO, &block, Vec3::new(0.1, 0.0, 0.0)));
        // stacked exactly on top
        assert!(!block.overlaps(Vec3::ZERO, &block, Vec3::new(0.0, 0.0, 0.1)));
    }

    #[test]
    fn partial_overlap_is_detected() {
        let block = BoxBody::cube(0.1);
        assert!(block.overlaps(Vec3::ZERO, &block, Vec3::new(0.05, 0.05, 0.05)));
    }

    #[test]
    fn default_bodies_by_type() {
        assert!(BoxBody::default_for("block").is_some());
        assert!(BoxBody::default_for("builderbot").is_some());
        assert!(BoxBody::default_for("light").is_none());
    }
}
