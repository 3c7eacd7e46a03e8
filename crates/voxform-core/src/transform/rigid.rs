//! Exactly invertible transforms: translation, rotation, scaling, chains

use std::sync::Arc;

use glam::{Quat, Vec3};

use super::Transform;
use crate::error::{Error, Result};
use crate::field::Aabb;

/// Translation by an offset vector
#[derive(Debug, Clone, Copy)]
pub struct Translation {
    pub offset: Vec3,
}

impl Translation {
    pub fn new(offset: Vec3) -> Self {
        Self { offset }
    }
}

impl Transform for Translation {
    fn apply(&self, p: Vec3) -> Vec3 {
        p + self.offset
    }

    fn apply_inverse(&self, p: Vec3) -> Vec3 {
        p - self.offset
    }
}

/// Rotation about the origin, stored with its cached inverse
#[derive(Debug, Clone, Copy)]
pub struct Rotation {
    rotation: Quat,
    inverse: Quat,
}

impl Rotation {
    pub fn new(rotation: Quat) -> Self {
        Self {
            rotation,
            inverse: rotation.inverse(),
        }
    }

    /// Rotation around an arbitrary axis (angle in radians); a zero or
    /// non-finite axis cannot be inverted and is rejected
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Result<Self> {
        let axis = axis.try_normalize().ok_or_else(|| {
            Error::InvalidTransform("rotation axis must be a nonzero finite vector".into())
        })?;
        Ok(Self::new(Quat::from_axis_angle(axis, angle)))
    }

    pub fn around_x(angle: f32) -> Self {
        Self::new(Quat::from_rotation_x(angle))
    }

    pub fn around_y(angle: f32) -> Self {
        Self::new(Quat::from_rotation_y(angle))
    }

    pub fn around_z(angle: f32) -> Self {
        Self::new(Quat::from_rotation_z(angle))
    }
}

impl Transform for Rotation {
    fn apply(&self, p: Vec3) -> Vec3 {
        self.rotation * p
    }

    fn apply_inverse(&self, p: Vec3) -> Vec3 {
        self.inverse * p
    }
}

/// Uniform scaling about the origin
#[derive(Debug, Clone, Copy)]
pub struct Scaling {
    factor: f32,
}

impl Scaling {
    /// A zero factor has no inverse and is rejected
    pub fn new(factor: f32) -> Result<Self> {
        if !factor.is_finite() || factor == 0.0 {
            return Err(Error::InvalidTransform(format!(
                "scale factor must be finite and nonzero, got {factor}"
            )));
        }
        Ok(Self { factor })
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }
}

impl Transform for Scaling {
    fn apply(&self, p: Vec3) -> Vec3 {
        p * self.factor
    }

    fn apply_inverse(&self, p: Vec3) -> Vec3 {
        p / self.factor
    }

    fn distance_scale(&self) -> f32 {
        self.factor.abs()
    }
}

/// Chain of transforms composed in addition order.
///
/// Forward composition is `T = T_n ∘ ... ∘ T_1`: the first transform
/// added is applied to the point first. Inverses therefore run in
/// reverse addition order.
#[derive(Clone, Default)]
pub struct Composite {
    members: Vec<Arc<dyn Transform>>,
}

impl Composite {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Append a transform to the end of the chain
    pub fn add<T: Transform + 'static>(&mut self, t: T) {
        self.members.push(Arc::new(t));
    }

    /// Builder-style [`Composite::add`]
    pub fn then<T: Transform + 'static>(mut self, t: T) -> Self {
        self.add(t);
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Transform for Composite {
    fn apply(&self, p: Vec3) -> Vec3 {
        self.members.iter().fold(p, |q, t| t.apply(q))
    }

    fn apply_inverse(&self, p: Vec3) -> Vec3 {
        self.members.iter().rev().fold(p, |q, t| t.apply_inverse(q))
    }

    fn distance_scale(&self) -> f32 {
        self.members.iter().map(|t| t.distance_scale()).product()
    }

    fn map_bounds(&self, b: Aabb) -> Aabb {
        self.members.iter().fold(b, |bb, t| t.map_bounds(bb))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn assert_round_trip(t: &dyn Transform, p: Vec3) {
        let q = t.apply_inverse(t.apply(p));
        assert_relative_eq!(q.x, p.x, epsilon = 1e-4);
        assert_relative_eq!(q.y, p.y, epsilon = 1e-4);
        assert_relative_eq!(q.z, p.z, epsilon = 1e-4);
    }

    fn test_points() -> Vec<Vec3> {
        vec![
            Vec3::ZERO,
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.2, 0.33, 7.9),
            Vec3::new(100.0, -50.0, 0.01),
        ]
    }

    #[test]
    fn rigid_transforms_round_trip() {
        let transforms: Vec<Box<dyn Transform>> = vec![
            Box::new(Translation::new(Vec3::new(1.0, -2.0, 3.0))),
            Box::new(Rotation::around_x(0.7)),
            Box::new(Rotation::around_y(-1.3)),
            Box::new(Rotation::around_z(PI)),
            Box::new(Rotation::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.5).unwrap()),
            Box::new(Scaling::new(2.5).unwrap()),
            Box::new(Scaling::new(-0.5).unwrap()),
        ];
        for t in &transforms {
            for p in test_points() {
                assert_round_trip(t.as_ref(), p);
            }
        }
    }

    #[test]
    fn rotation_quarter_turn_moves_axes() {
        let r = Rotation::around_z(FRAC_PI_2);
        let q = r.apply(Vec3::X);
        assert_relative_eq!(q.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(q.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn composite_applies_in_addition_order() {
        // Scale first, then translate: origin maps to the offset
        let t = Composite::new()
            .then(Scaling::new(2.0).unwrap())
            .then(Translation::new(Vec3::X));
        let q = t.apply(Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(q.x, 3.0);
        // Reversed composition gives a different answer
        let rev = Composite::new()
            .then(Translation::new(Vec3::X))
            .then(Scaling::new(2.0).unwrap());
        assert_relative_eq!(rev.apply(Vec3::new(1.0, 0.0, 0.0)).x, 4.0);
    }

    #[test]
    fn composite_inverse_runs_in_reverse_order() {
        let t = Composite::new()
            .then(Rotation::around_y(0.8))
            .then(Translation::new(Vec3::new(3.0, -1.0, 2.0)))
            .then(Scaling::new(0.5).unwrap());
        for p in test_points() {
            assert_round_trip(&t, p);
        }
    }

    #[test]
    fn composite_distance_scale_is_the_product() {
        let t = Composite::new()
            .then(Scaling::new(2.0).unwrap())
            .then(Translation::new(Vec3::X))
            .then(Scaling::new(3.0).unwrap());
        assert_relative_eq!(t.distance_scale(), 6.0);
    }

    #[test]
    fn zero_scale_is_rejected() {
        assert!(Scaling::new(0.0).is_err());
        assert!(Scaling::new(f32::NAN).is_err());
        assert!(matches!(
            Scaling::new(0.0),
            Err(Error::InvalidTransform(_))
        ));
    }

    #[test]
    fn zero_axis_rotation_is_rejected() {
        assert!(Rotation::from_axis_angle(Vec3::ZERO, 1.0).is_err());
    }
}
