//! Primitive fields with closed-form signed distances
//!
//! All primitives live in their local frame, centered at the origin unless
//! an explicit placement is given. Use transforms to position them.

use glam::{Vec2, Vec3};

use super::{Aabb, Field};
use crate::error::{Error, Result};

// ============================================================================
// Constructor functions (ergonomic API)
// ============================================================================

/// Create a sphere with given radius.
///
/// A negative radius is accepted and denotes an inverted "cavity" sphere
/// used in subtraction idioms; the distance is still `|p| - radius`.
pub fn sphere(radius: f32) -> Sphere {
    Sphere::new(radius)
}

/// Create a box with given half-extents (size/2 in each direction)
pub fn box3(half_extents: Vec3) -> Box3 {
    Box3::new(half_extents)
}

/// Create a cube with given edge length
pub fn cube(size: f32) -> Box3 {
    Box3::new(Vec3::splat(size * 0.5))
}

/// Create a box with rounded edges
pub fn rounded_box(half_extents: Vec3, rounding: f32) -> Result<Box3> {
    Box3::with_rounding(half_extents, rounding)
}

/// Create a torus lying in the XY plane
pub fn torus(major_radius: f32, minor_radius: f32) -> Torus {
    Torus::new(major_radius, minor_radius)
}

/// Create a capsule-capped cylinder along the segment `p0..p1`
pub fn cylinder(p0: Vec3, p1: Vec3, radius: f32) -> Result<Cylinder> {
    Cylinder::new(p0, p1, radius)
}

/// Create a half-space `dot(p, normal) - dist <= 0`
pub fn plane(normal: Vec3, dist: f32) -> Result<Plane> {
    Plane::new(normal, dist)
}

/// Create a field with the same value everywhere
pub fn constant(value: f32) -> Constant {
    Constant::new(value)
}

// ============================================================================
// Primitive Structs
// ============================================================================

/// Sphere centered at origin
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub radius: f32,
}

impl Sphere {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl Field for Sphere {
    fn evaluate(&self, p: Vec3) -> f32 {
        p.length() - self.radius
    }

    fn bounds(&self) -> Aabb {
        Aabb::cube(self.radius.abs())
    }
}

/// Axis-aligned box with optional edge rounding
#[derive(Debug, Clone, Copy)]
pub struct Box3 {
    pub half_extents: Vec3,
    pub rounding: f32,
}

impl Box3 {
    pub fn new(half_extents: Vec3) -> Self {
        Self {
            half_extents,
            rounding: 0.0,
        }
    }

    /// Box whose edges are rounded by `rounding >= 0`
    pub fn with_rounding(half_extents: Vec3, rounding: f32) -> Result<Self> {
        if !rounding.is_finite() || rounding < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "box rounding must be >= 0, got {rounding}"
            )));
        }
        Ok(Self {
            half_extents,
            rounding,
        })
    }
}

impl Field for Box3 {
    fn evaluate(&self, p: Vec3) -> f32 {
        let q = p.abs() - self.half_extents;
        q.max(Vec3::ZERO).length() + q.x.max(q.y.max(q.z)).min(0.0) - self.rounding
    }

    fn bounds(&self) -> Aabb {
        Aabb::new(-self.half_extents, self.half_extents).expand(self.rounding)
    }
}

/// Torus lying in the XY plane, tube centered at radius `major_radius`
#[derive(Debug, Clone, Copy)]
pub struct Torus {
    pub major_radius: f32,
    pub minor_radius: f32,
}

impl Torus {
    pub fn new(major_radius: f32, minor_radius: f32) -> Self {
        Self {
            major_radius,
            minor_radius,
        }
    }
}

impl Field for Torus {
    fn evaluate(&self, p: Vec3) -> f32 {
        let q = Vec2::new(Vec2::new(p.x, p.y).length() - self.major_radius, p.z);
        q.length() - self.minor_radius
    }

    fn bounds(&self) -> Aabb {
        let r = self.major_radius + self.minor_radius;
        Aabb::new(
            Vec3::new(-r, -r, -self.minor_radius),
            Vec3::new(r, r, self.minor_radius),
        )
    }
}

/// Capsule-capped cylinder along an arbitrary axis segment
#[derive(Debug, Clone, Copy)]
pub struct Cylinder {
    pub p0: Vec3,
    pub p1: Vec3,
    pub radius: f32,
}

impl Cylinder {
    pub fn new(p0: Vec3, p1: Vec3, radius: f32) -> Result<Self> {
        if (p1 - p0).length_squared() <= f32::EPSILON {
            return Err(Error::InvalidParameter(
                "cylinder axis segment is degenerate".into(),
            ));
        }
        Ok(Self { p0, p1, radius })
    }
}

impl Field for Cylinder {
    fn evaluate(&self, p: Vec3) -> f32 {
        let pa = p - self.p0;
        let ba = self.p1 - self.p0;
        let h = (pa.dot(ba) / ba.length_squared()).clamp(0.0, 1.0);
        (pa - ba * h).length() - self.radius
    }

    fn bounds(&self) -> Aabb {
        Aabb::new(self.p0.min(self.p1), self.p0.max(self.p1)).expand(self.radius)
    }
}

/// Half-space bounded by the plane `dot(p, normal) == dist`
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub normal: Vec3,
    pub dist: f32,
}

impl Plane {
    pub fn new(normal: Vec3, dist: f32) -> Result<Self> {
        let n = normal.try_normalize().ok_or_else(|| {
            Error::InvalidParameter("plane normal must be a nonzero vector".into())
        })?;
        Ok(Self { normal: n, dist })
    }
}

impl Field for Plane {
    fn evaluate(&self, p: Vec3) -> f32 {
        p.dot(self.normal) - self.dist
    }

    fn bounds(&self) -> Aabb {
        // Half-space, no intrinsic extent
        Aabb::INFINITE
    }
}

/// Field with the same value everywhere, useful as a combinator operand
#[derive(Debug, Clone, Copy)]
pub struct Constant {
    pub value: f32,
}

impl Constant {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl Field for Constant {
    fn evaluate(&self, _p: Vec3) -> f32 {
        self.value
    }

    fn bounds(&self) -> Aabb {
        Aabb::INFINITE
    }
}

// ============================================================================
// Tests
// ============================================================================
