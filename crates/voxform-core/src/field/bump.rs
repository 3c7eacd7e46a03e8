//! Emboss / engrave compositor
//!
//! Merges a base field and a secondary bump field into one field. The
//! bump value displaces the base surface: raised for embossing, recessed
//! for engraving. Sign and clamp bugs here flip or flatten the result,
//! so the evaluation order is fixed: raw bump -> scale and offset ->
//! clamp -> combine.

use glam::Vec3;

use super::combine::{smooth_max, smooth_min};
use super::{Aabb, Field, FieldNode};
use crate::error::{Error, Result};

/// Which way the bump displaces the base surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpMode {
    /// Raised detail, smooth-union semantics
    Emboss,
    /// Recessed detail, smooth-subtraction semantics
    Engrave,
}

/// Base field displaced by a clamped bump field.
///
/// `result(p) = combine(B(p), B(p) - clamp(U(p)*factor + offset,
/// depth*min_value, depth*max_value))` where `combine` is the smooth min
/// for embossing and the smooth max for engraving.
pub struct BumpComposite {
    base: FieldNode,
    bump: FieldNode,
    mode: BumpMode,
    factor: f32,
    offset: f32,
    min_value: f32,
    max_value: f32,
    depth: f32,
    blend: f32,
}

impl BumpComposite {
    pub fn new<B, U>(base: B, bump: U, mode: BumpMode) -> Self
    where
        B: Field + 'static,
        U: Field + 'static,
    {
        Self {
            base: FieldNode::new(base),
            bump: FieldNode::new(bump),
            mode,
            factor: 1.0,
            offset: 0.0,
            min_value: match mode {
                BumpMode::Emboss => 0.0,
                BumpMode::Engrave => -1.0,
            },
            max_value: match mode {
                BumpMode::Emboss => 1.0,
                BumpMode::Engrave => 0.0,
            },
            depth: 1.0,
            blend: 0.0,
        }
    }

    /// Linear remap of the raw bump value before clamping
    pub fn with_remap(mut self, factor: f32, offset: f32) -> Result<Self> {
        if !factor.is_finite() || !offset.is_finite() {
            return Err(Error::InvalidParameter(
                "bump remap must be finite".into(),
            ));
        }
        self.factor = factor;
        self.offset = offset;
        Ok(self)
    }

    /// Clamp range for the displacement, before depth scaling
    pub fn with_clamp(mut self, min_value: f32, max_value: f32) -> Result<Self> {
        if !min_value.is_finite() || !max_value.is_finite() || min_value > max_value {
            return Err(Error::InvalidParameter(format!(
                "bump clamp range [{min_value}, {max_value}] is invalid"
            )));
        }
        self.min_value = min_value;
        self.max_value = max_value;
        Ok(self)
    }

    /// Scale the effective clamp range
    pub fn with_depth(mut self, depth: f32) -> Result<Self> {
        if !depth.is_finite() || depth < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "bump depth must be >= 0, got {depth}"
            )));
        }
        self.depth = depth;
        Ok(self)
    }

    /// Smoothing radius for the seam against the base
    pub fn with_blend(mut self, blend: f32) -> Result<Self> {
        if !blend.is_finite() || blend < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "blend radius must be >= 0, got {blend}"
            )));
        }
        self.blend = blend;
        Ok(self)
    }

    fn displacement(&self, p: Vec3) -> f32 {
        let raw = self.bump.evaluate(p);
        let scaled = raw * self.factor + self.offset;
        scaled.clamp(self.depth * self.min_value, self.depth * self.max_value)
    }
}

impl Field for BumpComposite {
    fn evaluate(&self, p: Vec3) -> f32 {
        let base = self.base.evaluate(p);
        let displaced = base - self.displacement(p);
        match self.mode {
            BumpMode::Emboss => smooth_min(base, displaced, self.blend),
            BumpMode::Engrave => smooth_max(base, displaced, self.blend),
        }
    }

    fn bounds(&self) -> Aabb {
        let reach = self.depth * self.min_value.abs().max(self.max_value.abs());
        self.base.bounds().expand(reach + self.blend)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::primitives::{constant, sphere};
    use approx::assert_relative_eq;

    #[test]
    fn emboss_raises_the_surface() {
        // Positive constant bump on a sphere: surface moves outward where
        // the displacement applies
        let node = BumpComposite::new(sphere(10.0), constant(0.5), BumpMode::Emboss);
        let on_surface = Vec3::new(10.0, 0.0, 0.0);
        assert!(node.evaluate(on_surface) < 0.0);
        // The raised surface sits at radius 10.5
        assert_relative_eq!(node.evaluate(Vec3::new(10.5, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn engrave_recesses_the_surface() {
        let node = BumpComposite::new(sphere(10.0), constant(-0.5), BumpMode::Engrave);
        let on_surface = Vec3::new(10.0, 0.0, 0.0);
        assert!(node.evaluate(on_surface) > 0.0);
        // The recessed surface sits at radius 9.5
        assert_relative_eq!(node.evaluate(Vec3::new(9.5, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn clamp_bounds_the_displacement() {
        // Huge bump value, clamped to 0.25 before combining
        let node = BumpComposite::new(sphere(10.0), constant(100.0), BumpMode::Emboss)
            .with_clamp(0.0, 0.25)
            .unwrap();
        assert_relative_eq!(node.evaluate(Vec3::new(10.25, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn depth_scales_the_clamp_range() {
        let node = BumpComposite::new(sphere(10.0), constant(100.0), BumpMode::Emboss)
            .with_clamp(0.0, 0.25)
            .unwrap()
            .with_depth(2.0)
            .unwrap();
        assert_relative_eq!(node.evaluate(Vec3::new(10.5, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn remap_applies_before_clamp() {
        // raw 1.0 * factor 0.5 + offset -0.25 = 0.25, inside the clamp
        let node = BumpComposite::new(sphere(10.0), constant(1.0), BumpMode::Emboss)
            .with_remap(0.5, -0.25)
            .unwrap()
            .with_clamp(0.0, 1.0)
            .unwrap();
        assert_relative_eq!(node.evaluate(Vec3::new(10.25, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn engrave_default_clamp_ignores_positive_bumps() {
        // Positive bump values clamp to zero displacement in engrave mode
        let node = BumpComposite::new(sphere(10.0), constant(0.5), BumpMode::Engrave);
        assert_relative_eq!(node.evaluate(Vec3::new(10.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn blend_rounds_the_seam() {
        let sharp = BumpComposite::new(sphere(10.0), constant(-0.5), BumpMode::Engrave);
        let smooth = BumpComposite::new(sphere(10.0), constant(-0.5), BumpMode::Engrave)
            .with_blend(0.5)
            .unwrap();
        // Near the recessed surface the smooth variant pulls outward
        let p = Vec3::new(9.6, 0.0, 0.0);
        assert!(smooth.evaluate(p) >= sharp.evaluate(p));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let make = || BumpComposite::new(sphere(1.0), constant(0.0), BumpMode::Emboss);
        assert!(make().with_clamp(1.0, -1.0).is_err());
        assert!(make().with_depth(-1.0).is_err());
        assert!(make().with_blend(-0.5).is_err());
        assert!(make().with_remap(f32::NAN, 0.0).is_err());
    }

    #[test]
    fn bounds_expand_by_clamp_reach_and_blend() {
        let node = BumpComposite::new(sphere(10.0), constant(0.0), BumpMode::Emboss)
            .with_clamp(0.0, 0.5)
            .unwrap()
            .with_blend(0.25)
            .unwrap();
        let b = node.bounds();
        assert_relative_eq!(b.max.x, 10.75);
    }
}
