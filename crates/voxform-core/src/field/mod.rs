//! Signed distance fields for solid modeling
//!
//! A field maps any point in space to a scalar approximating signed
//! distance: negative inside the solid, positive outside, zero on the
//! surface. Clients build a tree of field nodes bottom-up and hand the
//! root to the rasterizer or to a scene container.
//!
//! ## Example
//!
//! ```rust,ignore
//! use voxform_core::prelude::*;
//!
//! // Two overlapping spheres, smoothly blended
//! let pair = sphere(15.0)
//!     .translate(-10.0, 0.0, 0.0)
//!     .smooth_union(sphere(15.0).translate(10.0, 0.0, 0.0), 2.0)?;
//! ```

pub mod bump;
pub mod combine;
pub mod grid_field;
pub mod pattern;
pub mod primitives;
pub mod relief;

use glam::Vec3;

use crate::error::Result;
use crate::transform::{self, Transform, Transformed};

/// The core field trait - any type that can report a signed distance
/// from a point.
///
/// Evaluation is a pure function of (tree, point): nodes hold no mutable
/// state, so a finalized tree may be evaluated from many threads at once.
pub trait Field: Send + Sync {
    /// Signed distance from point `p` to the surface.
    ///
    /// - Negative for points inside the solid
    /// - Positive for points outside
    /// - Zero on the surface
    fn evaluate(&self, p: Vec3) -> f32;

    /// Axis-aligned bounding box of the solid.
    ///
    /// Unbounded nodes (patterns, planes) report [`Aabb::INFINITE`] and
    /// must be intersected with a bounded shape before rasterization.
    fn bounds(&self) -> Aabb;
}

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The unbounded box, reported by fields with no intrinsic extent
    pub const INFINITE: Aabb = Aabb {
        min: Vec3::splat(f32::NEG_INFINITY),
        max: Vec3::splat(f32::INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a cube centered at origin
    pub fn cube(half_size: f32) -> Self {
        Self::new(Vec3::splat(-half_size), Vec3::splat(half_size))
    }

    /// Create from center and half-extents
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Expand the bounding box by a margin
    pub fn expand(&self, margin: f32) -> Self {
        Self::new(
            self.min - Vec3::splat(margin),
            self.max + Vec3::splat(margin),
        )
    }

    /// Merge two bounding boxes
    pub fn union(&self, other: &Aabb) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Overlap of two bounding boxes; may be empty (min > max per axis)
    pub fn intersection(&self, other: &Aabb) -> Self {
        Self::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// Get the size of the bounding box
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get the center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// True when every component is finite
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// True when the box encloses no volume on some axis
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// True when the point lies inside or on the box
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// A field node that can be composed and transformed.
///
/// Cloning is O(1); the underlying node is shared and immutable once
/// wrapped, which is what the rasterizer's read-only evaluation contract
/// relies on.
#[derive(Clone)]
pub struct FieldNode {
    inner: std::sync::Arc<dyn Field>,
}

impl FieldNode {
    /// Create a new field node from any type implementing Field
    pub fn new<F: Field + 'static>(field: F) -> Self {
        Self {
            inner: std::sync::Arc::new(field),
        }
    }
}

impl Field for FieldNode {
    fn evaluate(&self, p: Vec3) -> f32 {
        self.inner.evaluate(p)
    }

    fn bounds(&self) -> Aabb {
        self.inner.bounds()
    }
}

impl std::fmt::Debug for FieldNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldNode")
            .field("bounds", &self.bounds())
            .finish()
    }
}

/// Extension trait providing chainable operations on fields
pub trait FieldExt: Field + Sized + 'static {
    // === Boolean Operations ===

    /// Union: combine with another shape (OR)
    fn union<F: Field + 'static>(self, other: F) -> FieldNode {
        let mut node = combine::Union::new();
        node.add(self);
        node.add(other);
        FieldNode::new(node)
    }

    /// Intersection: keep only where both shapes overlap (AND)
    fn intersect<F: Field + 'static>(self, other: F) -> FieldNode {
        let mut node = combine::Intersection::new();
        node.add(self);
        node.add(other);
        FieldNode::new(node)
    }

    /// Subtraction: cut `other` out of `self`
    fn subtract<F: Field + 'static>(self, other: F) -> FieldNode {
        let mut node = combine::Subtraction::new();
        node.add(self);
        node.add(other);
        FieldNode::new(node)
    }

    /// Smooth union with blend radius `k`
    fn smooth_union<F: Field + 'static>(self, other: F, k: f32) -> Result<FieldNode> {
        let mut node = combine::Union::new();
        node.add(self);
        node.add(other);
        node.set_blend(k)?;
        Ok(FieldNode::new(node))
    }

    /// Smooth intersection with blend radius `k`
    fn smooth_intersect<F: Field + 'static>(self, other: F, k: f32) -> Result<FieldNode> {
        let mut node = combine::Intersection::new();
        node.add(self);
        node.add(other);
        node.set_blend(k)?;
        Ok(FieldNode::new(node))
    }

    /// Smooth subtraction with blend radius `k`
    fn smooth_subtract<F: Field + 'static>(self, other: F, k: f32) -> Result<FieldNode> {
        let mut node = combine::Subtraction::new();
        node.add(self);
        node.add(other);
        node.set_blend(k)?;
        Ok(FieldNode::new(node))
    }

    // === Transforms ===

    /// Translate (move) the shape
    fn translate(self, x: f32, y: f32, z: f32) -> FieldNode {
        FieldNode::new(Transformed::new(
            self,
            transform::Translation::new(Vec3::new(x, y, z)),
        ))
    }

    /// Rotate around X axis (angle in radians)
    fn rotate_x(self, angle: f32) -> FieldNode {
        FieldNode::new(Transformed::new(self, transform::Rotation::around_x(angle)))
    }

    /// Rotate around Y axis (angle in radians)
    fn rotate_y(self, angle: f32) -> FieldNode {
        FieldNode::new(Transformed::new(self, transform::Rotation::around_y(angle)))
    }

    /// Rotate around Z axis (angle in radians)
    fn rotate_z(self, angle: f32) -> FieldNode {
        FieldNode::new(Transformed::new(self, transform::Rotation::around_z(angle)))
    }

    /// Rotate around an arbitrary axis (angle in radians)
    fn rotate(self, axis: Vec3, angle: f32) -> Result<FieldNode> {
        let rot = transform::Rotation::from_axis_angle(axis, angle)?;
        Ok(FieldNode::new(Transformed::new(self, rot)))
    }

    /// Uniform scale; zero factor is rejected
    fn scale(self, factor: f32) -> Result<FieldNode> {
        let scaling = transform::Scaling::new(factor)?;
        Ok(FieldNode::new(Transformed::new(self, scaling)))
    }

    /// Reflect across the plane `dot(p, normal) == dist`
    fn reflect(self, normal: Vec3, dist: f32) -> Result<FieldNode> {
        let refl = transform::PlaneReflection::new(normal, dist)?;
        Ok(FieldNode::new(Transformed::new(self, refl)))
    }

    /// Tile space with copies folded into a rectangular fundamental domain
    fn wrap_periodic(self, origin: Vec3, spacing: Vec3) -> Result<FieldNode> {
        let wrap = transform::PeriodicWrap::new(origin, spacing)?;
        Ok(FieldNode::new(Transformed::new(self, wrap)))
    }

    /// Invert space through a sphere
    fn invert_sphere(self, center: Vec3, radius: f32) -> Result<FieldNode> {
        let inv = transform::SphereInversion::new(center, radius)?;
        Ok(FieldNode::new(Transformed::new(self, inv)))
    }

    /// Bend the shape around a cylinder of the given radius (Y axis)
    fn ring_wrap(self, radius: f32) -> Result<FieldNode> {
        let wrap = transform::RingWrap::new(radius)?;
        Ok(FieldNode::new(Transformed::new(self, wrap)))
    }

    /// Apply an arbitrary transform
    fn transformed<T: Transform + 'static>(self, transform: T) -> FieldNode {
        FieldNode::new(Transformed::new(self, transform))
    }

    /// Wrap into a shareable node handle
    fn node(self) -> FieldNode {
        FieldNode::new(self)
    }
}

// Implement FieldExt for all types that implement Field
impl<T: Field + 'static> FieldExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::primitives::sphere;
    use approx::assert_relative_eq;

    #[test]
    fn aabb_union_covers_both() {
        let a = Aabb::cube(1.0);
        let b = Aabb::from_center(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE);
        let u = a.union(&b);
        assert_relative_eq!(u.min.x, -1.0);
        assert_relative_eq!(u.max.x, 6.0);
    }

    #[test]
    fn aabb_intersection_of_disjoint_is_empty() {
        let a = Aabb::cube(1.0);
        let b = Aabb::from_center(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE);
        assert!(a.intersection(&b).is_empty());
    }

    #[test]
    fn aabb_infinite_is_not_finite() {
        assert!(!Aabb::INFINITE.is_finite());
        assert!(Aabb::cube(2.0).is_finite());
    }

    #[test]
    fn intersection_with_infinite_keeps_finite_box() {
        let b = Aabb::cube(3.0).intersection(&Aabb::INFINITE);
        assert!(b.is_finite());
        assert_relative_eq!(b.max.x, 3.0);
    }

    #[test]
    fn node_shares_evaluation() {
        let node = sphere(1.0).node();
        let copy = node.clone();
        assert_relative_eq!(node.evaluate(Vec3::ZERO), copy.evaluate(Vec3::ZERO));
    }
}
