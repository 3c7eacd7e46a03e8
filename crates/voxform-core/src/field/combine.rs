//! Boolean combinators - n-ary union, intersection, subtraction
//!
//! Each combinator holds an ordered sequence of children and a blend
//! radius. With blend 0 the result is exact hard CSG (min/max); a positive
//! blend rounds the seams with the polynomial smooth-min, folded
//! left-to-right over the children.

use glam::Vec3;

use super::{Aabb, Field, FieldNode};
use crate::error::{Error, Result};

/// Polynomial smooth minimum with blend radius `k`.
///
/// `smin(a, b, k) = min(a, b) - h^2 * k / 4` with
/// `h = max(k - |a - b|, 0) / k`. At `k == 0` this is exactly `min`.
pub fn smooth_min(a: f32, b: f32, k: f32) -> f32 {
    if k <= 0.0 {
        return a.min(b);
    }
    let h = (k - (a - b).abs()).max(0.0) / k;
    a.min(b) - h * h * k * 0.25
}

/// Polynomial smooth maximum, dual of [`smooth_min`]
pub fn smooth_max(a: f32, b: f32, k: f32) -> f32 {
    -smooth_min(-a, -b, k)
}

fn check_blend(k: f32) -> Result<f32> {
    if !k.is_finite() || k < 0.0 {
        return Err(Error::InvalidParameter(format!(
            "blend radius must be >= 0, got {k}"
        )));
    }
    Ok(k)
}

// ============================================================================
// Union
// ============================================================================

/// Union of an ordered sequence of children (OR)
pub struct Union {
    children: Vec<FieldNode>,
    blend: f32,
}

impl Union {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            blend: 0.0,
        }
    }

    /// Union of prebuilt nodes with blend 0
    pub fn of(children: Vec<FieldNode>) -> Self {
        Self {
            children,
            blend: 0.0,
        }
    }

    /// Append a child; children keep their addition order
    pub fn add<F: Field + 'static>(&mut self, child: F) {
        self.children.push(FieldNode::new(child));
    }

    /// Set the blend radius; negative values are rejected
    pub fn set_blend(&mut self, k: f32) -> Result<()> {
        self.blend = check_blend(k)?;
        Ok(())
    }

    pub fn blend(&self) -> f32 {
        self.blend
    }
}

impl Default for Union {
    fn default() -> Self {
        Self::new()
    }
}

impl Field for Union {
    fn evaluate(&self, p: Vec3) -> f32 {
        let mut iter = self.children.iter();
        let Some(first) = iter.next() else {
            // Union of nothing is the empty solid
            return f32::MAX;
        };
        let mut d = first.evaluate(p);
        for child in iter {
            d = smooth_min(d, child.evaluate(p), self.blend);
        }
        d
    }

    fn bounds(&self) -> Aabb {
        let mut iter = self.children.iter();
        let Some(first) = iter.next() else {
            return Aabb::new(Vec3::ZERO, Vec3::ZERO);
        };
        let mut b = first.bounds();
        for child in iter {
            b = b.union(&child.bounds());
        }
        b.expand(self.blend)
    }
}

// ============================================================================
// Intersection
// ============================================================================

/// Intersection of an ordered sequence of children (AND)
pub struct Intersection {
    children: Vec<FieldNode>,
    blend: f32,
}

impl Intersection {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            blend: 0.0,
        }
    }

    /// Intersection of prebuilt nodes with blend 0
    pub fn of(children: Vec<FieldNode>) -> Self {
        Self {
            children,
            blend: 0.0,
        }
    }

    /// Append a child; children keep their addition order
    pub fn add<F: Field + 'static>(&mut self, child: F) {
        self.children.push(FieldNode::new(child));
    }

    /// Set the blend radius; negative values are rejected
    pub fn set_blend(&mut self, k: f32) -> Result<()> {
        self.blend = check_blend(k)?;
        Ok(())
    }

    pub fn blend(&self) -> f32 {
        self.blend
    }
}

impl Default for Intersection {
    fn default() -> Self {
        Self::new()
    }
}

impl Field for Intersection {
    fn evaluate(&self, p: Vec3) -> f32 {
        let mut iter = self.children.iter();
        let Some(first) = iter.next() else {
            return f32::MAX;
        };
        let mut d = first.evaluate(p);
        for child in iter {
            d = smooth_max(d, child.evaluate(p), self.blend);
        }
        d
    }

    fn bounds(&self) -> Aabb {
        let mut iter = self.children.iter();
        let Some(first) = iter.next() else {
            return Aabb::new(Vec3::ZERO, Vec3::ZERO);
        };
        let mut b = first.bounds();
        for child in iter {
            b = b.intersection(&child.bounds());
        }
        b
    }
}

// ============================================================================
// Subtraction
// ============================================================================

/// First child minus the union of the remaining children.
///
/// `Subtraction(A, B, ...) = A ∩ -B ∩ ...`; operand order is always the
/// caller's explicit choice.
pub struct Subtraction {
    children: Vec<FieldNode>,
    blend: f32,
}

impl Subtraction {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            blend: 0.0,
        }
    }

    /// Subtraction over prebuilt nodes with blend 0
    pub fn of(children: Vec<FieldNode>) -> Self {
        Self {
            children,
            blend: 0.0,
        }
    }

    /// Append a child; the first child added is the base shape
    pub fn add<F: Field + 'static>(&mut self, child: F) {
        self.children.push(FieldNode::new(child));
    }

    /// Set the blend radius; negative values are rejected
    pub fn set_blend(&mut self, k: f32) -> Result<()> {
        self.blend = check_blend(k)?;
        Ok(())
    }

    pub fn blend(&self) -> f32 {
        self.blend
    }
}

impl Default for Subtraction {
    fn default() -> Self {
        Self::new()
    }
}

impl Field for Subtraction {
    fn evaluate(&self, p: Vec3) -> f32 {
        let mut iter = self.children.iter();
        let Some(first) = iter.next() else {
            return f32::MAX;
        };
        let mut d = first.evaluate(p);
        for child in iter {
            d = smooth_max(d, -child.evaluate(p), self.blend);
        }
        d
    }

    fn bounds(&self) -> Aabb {
        // Subtraction can only remove material from the base shape
        match self.children.first() {
            Some(first) => first.bounds(),
            None => Aabb::new(Vec3::ZERO, Vec3::ZERO),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
