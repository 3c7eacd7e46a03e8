//! Non-rigid warps: periodic wrap, sphere inversion, ring wrap, reflection
//!
//! Warps define their own forward/inverse pair and only approximately
//! preserve the distance metric near high-curvature regions. Callers
//! should choose blend radii conservatively near such regions.

use glam::Vec3;

use super::Transform;
use crate::error::{Error, Result};
use crate::field::Aabb;

/// Fold space into a rectangular fundamental domain anchored at `origin`.
///
/// Axes with positive spacing wrap by component-wise modulo; axes with
/// zero spacing pass through, so one, two, or three periodic directions
/// are supported. The inverse (world to local) map is the fold; the
/// forward map is the identity embedding of the fundamental domain.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicWrap {
    origin: Vec3,
    spacing: Vec3,
}

impl PeriodicWrap {
    pub fn new(origin: Vec3, spacing: Vec3) -> Result<Self> {
        if !origin.is_finite() || !spacing.is_finite() {
            return Err(Error::InvalidTransform(
                "periodic wrap parameters must be finite".into(),
            ));
        }
        if spacing.cmplt(Vec3::ZERO).any() {
            return Err(Error::InvalidTransform(format!(
                "periodic wrap spacing must be >= 0 per axis, got {spacing}"
            )));
        }
        if spacing.cmple(Vec3::ZERO).all() {
            return Err(Error::InvalidTransform(
                "periodic wrap needs at least one positive spacing".into(),
            ));
        }
        Ok(Self { origin, spacing })
    }

    fn fold(&self, p: Vec3) -> Vec3 {
        let rel = p - self.origin;
        let fold_axis = |v: f32, s: f32| if s > 0.0 { v.rem_euclid(s) } else { v };
        self.origin
            + Vec3::new(
                fold_axis(rel.x, self.spacing.x),
                fold_axis(rel.y, self.spacing.y),
                fold_axis(rel.z, self.spacing.z),
            )
    }
}

impl Transform for PeriodicWrap {
    fn apply(&self, p: Vec3) -> Vec3 {
        p
    }

    fn apply_inverse(&self, p: Vec3) -> Vec3 {
        self.fold(p)
    }

    fn map_bounds(&self, _b: Aabb) -> Aabb {
        // The tile repeats forever along the wrapped axes
        Aabb::INFINITE
    }
}

/// Inversion through a sphere: `p -> center + r^2 (p - center)/|p - center|^2`
#[derive(Debug, Clone, Copy)]
pub struct SphereInversion {
    center: Vec3,
    radius: f32,
}

impl SphereInversion {
    pub fn new(center: Vec3, radius: f32) -> Result<Self> {
        if !center.is_finite() || !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidTransform(format!(
                "sphere inversion radius must be > 0, got {radius}"
            )));
        }
        Ok(Self { center, radius })
    }

    fn invert(&self, p: Vec3) -> Vec3 {
        let rel = p - self.center;
        let d2 = rel.length_squared().max(f32::EPSILON);
        self.center + rel * (self.radius * self.radius / d2)
    }
}

impl Transform for SphereInversion {
    fn apply(&self, p: Vec3) -> Vec3 {
        self.invert(p)
    }

    // Inversion is an involution
    fn apply_inverse(&self, p: Vec3) -> Vec3 {
        self.invert(p)
    }

    fn map_bounds(&self, b: Aabb) -> Aabb {
        if !b.is_finite() || b.contains(self.center) {
            // The image of a region touching the center is unbounded
            return Aabb::INFINITE;
        }
        // The box maps inside the sphere of radius r^2 / dist(center, box)
        let nearest = self.center.clamp(b.min, b.max);
        let dist = (nearest - self.center).length();
        if dist <= f32::EPSILON {
            return Aabb::INFINITE;
        }
        let reach = self.radius * self.radius / dist;
        Aabb::from_center(self.center, Vec3::splat(reach))
    }
}

/// Bend the X axis around a cylinder of the given radius about the Y axis.
///
/// Local space is the flat band: `x` is arc length along the ring, `z` is
/// the radial offset from the cylinder surface. The forward map rolls the
/// band into a ring; the inverse unrolls world points back onto the band.
#[derive(Debug, Clone, Copy)]
pub struct RingWrap {
    radius: f32,
}

impl RingWrap {
    pub fn new(radius: f32) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidTransform(format!(
                "ring wrap radius must be > 0, got {radius}"
            )));
        }
        Ok(Self { radius })
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Transform for RingWrap {
    fn apply(&self, p: Vec3) -> Vec3 {
        let angle = p.x / self.radius;
        let r = self.radius + p.z;
        Vec3::new(r * angle.sin(), p.y, r * angle.cos())
    }

    fn apply_inverse(&self, p: Vec3) -> Vec3 {
        let angle = p.x.atan2(p.z);
        let r = Vec3::new(p.x, 0.0, p.z).length();
        Vec3::new(self.radius * angle, p.y, r - self.radius)
    }

    fn map_bounds(&self, b: Aabb) -> Aabb {
        if !b.is_finite() {
            return Aabb::INFINITE;
        }
        // Conservative: the full ring swept by the band's radial extent
        let reach = self.radius + b.max.z.abs().max(b.min.z.abs());
        Aabb::new(
            Vec3::new(-reach, b.min.y, -reach),
            Vec3::new(reach, b.max.y, reach),
        )
    }
}

/// Reflection across the plane `dot(p, normal) == dist`
#[derive(Debug, Clone, Copy)]
pub struct PlaneReflection {
    normal: Vec3,
    dist: f32,
}

impl PlaneReflection {
    pub fn new(normal: Vec3, dist: f32) -> Result<Self> {
        let n = normal.try_normalize().ok_or_else(|| {
            Error::InvalidTransform("reflection normal must be a nonzero vector".into())
        })?;
        Ok(Self { normal: n, dist })
    }

    fn reflect(&self, p: Vec3) -> Vec3 {
        p - 2.0 * (p.dot(self.normal) - self.dist) * self.normal
    }
}

impl Transform for PlaneReflection {
    fn apply(&self, p: Vec3) -> Vec3 {
        self.reflect(p)
    }

    // Reflection is an involution
    fn apply_inverse(&self, p: Vec3) -> Vec3 {
        self.reflect(p)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::primitives::sphere;
    use crate::field::{Field, FieldExt};
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn periodic_wrap_folds_into_the_domain() {
        let wrap = PeriodicWrap::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)).unwrap();
        let q = wrap.apply_inverse(Vec3::new(5.5, 1.0, -3.0));
        assert_relative_eq!(q.x, 1.5);
        assert_relative_eq!(q.y, 1.0);
        assert_relative_eq!(q.z, -3.0);
        // Negative coordinates fold forward into the domain
        let neg = wrap.apply_inverse(Vec3::new(-0.5, 0.0, 0.0));
        assert_relative_eq!(neg.x, 1.5);
    }

    #[test]
    fn periodic_wrap_repeats_a_shape() {
        let tiled = sphere(0.5)
            .translate(1.0, 0.0, 0.0)
            .wrap_periodic(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0))
            .unwrap();
        // Copies at x = 1, 3, 5, ...
        assert!(tiled.evaluate(Vec3::new(1.0, 0.0, 0.0)) < 0.0);
        assert!(tiled.evaluate(Vec3::new(5.0, 0.0, 0.0)) < 0.0);
        assert!(tiled.evaluate(Vec3::new(2.0, 0.0, 0.0)) > 0.0);
        assert!(!tiled.bounds().is_finite());
    }

    #[test]
    fn periodic_wrap_respects_its_origin() {
        let wrap = PeriodicWrap::new(Vec3::new(0.5, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)).unwrap();
        let q = wrap.apply_inverse(Vec3::new(0.4, 0.0, 0.0));
        // 0.4 is below the origin, folds to origin + 1.9
        assert_relative_eq!(q.x, 2.4, epsilon = 1e-6);
    }

    #[test]
    fn periodic_wrap_rejects_bad_spacing() {
        assert!(PeriodicWrap::new(Vec3::ZERO, Vec3::ZERO).is_err());
        assert!(PeriodicWrap::new(Vec3::ZERO, Vec3::new(-1.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn sphere_inversion_is_an_involution() {
        let inv = SphereInversion::new(Vec3::new(1.0, 0.0, 0.0), 2.0).unwrap();
        for p in [
            Vec3::new(3.0, 1.0, 0.0),
            Vec3::new(0.0, 0.5, -2.0),
            Vec3::new(10.0, 10.0, 10.0),
        ] {
            let q = inv.apply_inverse(inv.apply(p));
            assert_relative_eq!(q.x, p.x, epsilon = 1e-4);
            assert_relative_eq!(q.y, p.y, epsilon = 1e-4);
            assert_relative_eq!(q.z, p.z, epsilon = 1e-4);
        }
    }

    #[test]
    fn sphere_inversion_fixes_its_sphere() {
        let inv = SphereInversion::new(Vec3::ZERO, 2.0).unwrap();
        let on_sphere = Vec3::new(2.0, 0.0, 0.0);
        let q = inv.apply(on_sphere);
        assert_relative_eq!(q.x, 2.0, epsilon = 1e-6);
        // Points inside map outside and vice versa
        assert!(inv.apply(Vec3::new(1.0, 0.0, 0.0)).length() > 2.0);
        assert!(inv.apply(Vec3::new(8.0, 0.0, 0.0)).length() < 2.0);
    }

    #[test]
    fn sphere_inversion_bounds_blow_up_at_the_center() {
        let inv = SphereInversion::new(Vec3::ZERO, 1.0).unwrap();
        assert!(!inv.map_bounds(Aabb::cube(1.0)).is_finite());
        let shifted = Aabb::from_center(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE);
        assert!(inv.map_bounds(shifted).is_finite());
    }

    #[test]
    fn ring_wrap_rolls_the_band_around_the_cylinder() {
        let wrap = RingWrap::new(4.0).unwrap();
        // Arc length zero sits on the +Z side of the cylinder
        let q = wrap.apply(Vec3::ZERO);
        assert_relative_eq!(q.z, 4.0, epsilon = 1e-6);
        // A quarter of the circumference lands on +X
        let quarter = wrap.apply(Vec3::new(4.0 * FRAC_PI_2, 0.0, 0.0));
        assert_relative_eq!(quarter.x, 4.0, epsilon = 1e-5);
        assert_relative_eq!(quarter.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn ring_wrap_round_trips_near_the_band() {
        let wrap = RingWrap::new(4.0).unwrap();
        for p in [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.5),
            Vec3::new(-3.0, -1.0, -0.5),
        ] {
            let q = wrap.apply_inverse(wrap.apply(p));
            assert_relative_eq!(q.x, p.x, epsilon = 1e-4);
            assert_relative_eq!(q.y, p.y, epsilon = 1e-4);
            assert_relative_eq!(q.z, p.z, epsilon = 1e-4);
        }
    }

    #[test]
    fn plane_reflection_round_trips_and_mirrors() {
        let refl = PlaneReflection::new(Vec3::X, 1.0).unwrap();
        let p = Vec3::new(3.0, 2.0, -1.0);
        let q = refl.apply(p);
        // x = 3 mirrors across x = 1 to x = -1
        assert_relative_eq!(q.x, -1.0);
        assert_relative_eq!(q.y, 2.0);
        let back = refl.apply_inverse(q);
        assert_relative_eq!(back.x, p.x, epsilon = 1e-5);
    }

    #[test]
    fn warps_report_unit_distance_scale() {
        let wrap = RingWrap::new(4.0).unwrap();
        assert_relative_eq!(wrap.distance_scale(), 1.0);
    }
}
