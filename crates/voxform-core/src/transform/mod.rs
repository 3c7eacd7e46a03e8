//! Space transforms applied to fields via inverse-point mapping
//!
//! A [`Transform`] maps points forward (local to world) and backward
//! (world to local). A [`Transformed`] node evaluates its child at the
//! inverse-mapped point, so the shape appears moved by the forward map.
//! Rigid transforms preserve distance; warps only approximate it near
//! high-curvature regions, which is an accepted modeling approximation.

mod rigid;
mod warp;

pub use rigid::{Composite, Rotation, Scaling, Translation};
pub use warp::{PeriodicWrap, PlaneReflection, RingWrap, SphereInversion};

use glam::Vec3;

use crate::field::{Aabb, Field, FieldNode};

/// A space mapping with a forward and an inverse direction
pub trait Transform: Send + Sync {
    /// Map a point from local (child) space into world space
    fn apply(&self, p: Vec3) -> Vec3;

    /// Map a point from world space into local (child) space
    fn apply_inverse(&self, p: Vec3) -> Vec3;

    /// Uniform factor by which the mapping stretches distances; 1 for
    /// everything except uniform scaling
    fn distance_scale(&self) -> f32 {
        1.0
    }

    /// Forward-map a bounding box. The default maps the eight corners,
    /// which is exact for affine maps; warps override with conservative
    /// boxes.
    fn map_bounds(&self, b: Aabb) -> Aabb {
        if !b.is_finite() {
            return Aabb::INFINITE;
        }
        let corners = [
            Vec3::new(b.min.x, b.min.y, b.min.z),
            Vec3::new(b.max.x, b.min.y, b.min.z),
            Vec3::new(b.min.x, b.max.y, b.min.z),
            Vec3::new(b.max.x, b.max.y, b.min.z),
            Vec3::new(b.min.x, b.min.y, b.max.z),
            Vec3::new(b.max.x, b.min.y, b.max.z),
            Vec3::new(b.min.x, b.max.y, b.max.z),
            Vec3::new(b.max.x, b.max.y, b.max.z),
        ];
        let mut new_min = Vec3::splat(f32::MAX);
        let mut new_max = Vec3::splat(f32::MIN);
        for corner in corners {
            let mapped = self.apply(corner);
            new_min = new_min.min(mapped);
            new_max = new_max.max(mapped);
        }
        Aabb::new(new_min, new_max)
    }
}

impl<T: Transform + ?Sized> Transform for std::sync::Arc<T> {
    fn apply(&self, p: Vec3) -> Vec3 {
        (**self).apply(p)
    }

    fn apply_inverse(&self, p: Vec3) -> Vec3 {
        (**self).apply_inverse(p)
    }

    fn distance_scale(&self) -> f32 {
        (**self).distance_scale()
    }

    fn map_bounds(&self, b: Aabb) -> Aabb {
        (**self).map_bounds(b)
    }
}

/// A child field evaluated through a transform
pub struct Transformed<T: Transform> {
    child: FieldNode,
    transform: T,
}

impl<T: Transform> Transformed<T> {
    pub fn new<F: Field + 'static>(child: F, transform: T) -> Self {
        Self {
            child: FieldNode::new(child),
            transform,
        }
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }
}

impl<T: Transform> Field for Transformed<T> {
    fn evaluate(&self, p: Vec3) -> f32 {
        let local = self.transform.apply_inverse(p);
        self.child.evaluate(local) * self.transform.distance_scale()
    }

    fn bounds(&self) -> Aabb {
        self.transform.map_bounds(self.child.bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldExt;
    use crate::field::primitives::sphere;
    use approx::assert_relative_eq;

    #[test]
    fn transformed_evaluates_child_at_inverse_point() {
        let moved = sphere(1.0).translate(3.0, 0.0, 0.0);
        assert_relative_eq!(moved.evaluate(Vec3::new(3.0, 0.0, 0.0)), -1.0);
        assert_relative_eq!(moved.evaluate(Vec3::new(5.0, 0.0, 0.0)), 1.0);
    }

    #[test]
    fn transformed_bounds_follow_the_forward_map() {
        let moved = sphere(1.0).translate(3.0, 0.0, 0.0);
        let b = moved.bounds();
        assert_relative_eq!(b.min.x, 2.0);
        assert_relative_eq!(b.max.x, 4.0);
    }

    #[test]
    fn scaling_corrects_the_distance_metric() {
        let big = sphere(1.0).scale(2.0).unwrap();
        // Surface at radius 2, and the value is a true distance
        assert_relative_eq!(big.evaluate(Vec3::new(2.0, 0.0, 0.0)), 0.0);
        assert_relative_eq!(big.evaluate(Vec3::new(3.0, 0.0, 0.0)), 1.0);
        assert_relative_eq!(big.evaluate(Vec3::ZERO), -2.0);
    }
}
