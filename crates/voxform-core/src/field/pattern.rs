//! Periodic volume patterns
//!
//! Triply periodic implicit surfaces (gyroid, Schwarz P/D, Lidinoid,
//! Scherk) plus a value-noise band. Each pattern scales space by
//! `factor = 2*pi/period`, shifts the raw value by `level`, normalizes by
//! the factor to approximate distance units, and keeps a band of
//! half-width `thickness/2` around the isosurface.
//!
//! Patterns fill all of space: their bounds are infinite and they must be
//! intersected with a bounded shape before rasterization.

use std::f32::consts::TAU;

use glam::Vec3;
use noise::{NoiseFn, Value};

use super::{Aabb, Field};
use crate::error::{Error, Result};

/// Create a gyroid surface band
pub fn gyroid(period: f32, thickness: f32) -> Result<Gyroid> {
    Gyroid::new(period, thickness)
}

/// Create a Schwarz P surface band
pub fn schwarz_p(period: f32, thickness: f32) -> Result<SchwarzP> {
    SchwarzP::new(period, thickness)
}

/// Create a Schwarz D (diamond) surface band
pub fn schwarz_d(period: f32, thickness: f32) -> Result<SchwarzD> {
    SchwarzD::new(period, thickness)
}

/// Create a Lidinoid surface band
pub fn lidinoid(period: f32, thickness: f32) -> Result<Lidinoid> {
    Lidinoid::new(period, thickness)
}

/// Create a Scherk surface band
pub fn scherk(period: f32, thickness: f32) -> Result<Scherk> {
    Scherk::new(period, thickness)
}

/// Create a value-noise band with the default seed
pub fn noise_band(period: f32, thickness: f32) -> Result<NoiseBand> {
    NoiseBand::new(period, thickness)
}

fn check_period(period: f32) -> Result<f32> {
    if !period.is_finite() || period <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "pattern period must be > 0, got {period}"
        )));
    }
    Ok(period)
}

fn check_thickness(thickness: f32) -> Result<f32> {
    if !thickness.is_finite() || thickness < 0.0 {
        return Err(Error::InvalidParameter(format!(
            "pattern thickness must be >= 0, got {thickness}"
        )));
    }
    Ok(thickness)
}

/// Shared band conversion: raw implicit value, already normalized to
/// approximate distance units, into a signed thickness band
fn band(normalized: f32, thickness: f32) -> f32 {
    normalized.abs() - thickness * 0.5
}

macro_rules! pattern_accessors {
    () => {
        /// Isosurface level shift
        pub fn set_level(&mut self, level: f32) -> Result<()> {
            if !level.is_finite() {
                return Err(Error::InvalidParameter(format!(
                    "pattern level must be finite, got {level}"
                )));
            }
            self.level = level;
            Ok(())
        }

        pub fn period(&self) -> f32 {
            self.period
        }

        pub fn thickness(&self) -> f32 {
            self.thickness
        }

        pub fn level(&self) -> f32 {
            self.level
        }
    };
}

// ============================================================================
// Triply periodic minimal surfaces
// ============================================================================

/// Gyroid: `sin x cos y + sin y cos z + sin z cos x`
#[derive(Debug, Clone, Copy)]
pub struct Gyroid {
    period: f32,
    thickness: f32,
    level: f32,
}

impl Gyroid {
    pub fn new(period: f32, thickness: f32) -> Result<Self> {
        Ok(Self {
            period: check_period(period)?,
            thickness: check_thickness(thickness)?,
            level: 0.0,
        })
    }

    pattern_accessors!();
}

impl Field for Gyroid {
    fn evaluate(&self, p: Vec3) -> f32 {
        let f = TAU / self.period;
        let (x, y, z) = (p.x * f, p.y * f, p.z * f);
        let raw = x.sin() * y.cos() + y.sin() * z.cos() + z.sin() * x.cos();
        band((raw - self.level) / f, self.thickness)
    }

    fn bounds(&self) -> Aabb {
        Aabb::INFINITE
    }
}

/// Schwarz P: `cos x + cos y + cos z`
#[derive(Debug, Clone, Copy)]
pub struct SchwarzP {
    period: f32,
    thickness: f32,
    level: f32,
}

impl SchwarzP {
    pub fn new(period: f32, thickness: f32) -> Result<Self> {
        Ok(Self {
            period: check_period(period)?,
            thickness: check_thickness(thickness)?,
            level: 0.0,
        })
    }

    pattern_accessors!();
}

impl Field for SchwarzP {
    fn evaluate(&self, p: Vec3) -> f32 {
        let f = TAU / self.period;
        let raw = (p.x * f).cos() + (p.y * f).cos() + (p.z * f).cos();
        band((raw - self.level) / f, self.thickness)
    }

    fn bounds(&self) -> Aabb {
        Aabb::INFINITE
    }
}

/// Schwarz D (diamond):
/// `sx sy sz + sx cy cz + cx sy cz + cx cy sz`
#[derive(Debug, Clone, Copy)]
pub struct SchwarzD {
    period: f32,
    thickness: f32,
    level: f32,
}

impl SchwarzD {
    pub fn new(period: f32, thickness: f32) -> Result<Self> {
        Ok(Self {
            period: check_period(period)?,
            thickness: check_thickness(thickness)?,
            level: 0.0,
        })
    }

    pattern_accessors!();
}

impl Field for SchwarzD {
    fn evaluate(&self, p: Vec3) -> f32 {
        let f = TAU / self.period;
        let (x, y, z) = (p.x * f, p.y * f, p.z * f);
        let (sx, cx) = x.sin_cos();
        let (sy, cy) = y.sin_cos();
        let (sz, cz) = z.sin_cos();
        let raw = sx * sy * sz + sx * cy * cz + cx * sy * cz + cx * cy * sz;
        band((raw - self.level) / f, self.thickness)
    }

    fn bounds(&self) -> Aabb {
        Aabb::INFINITE
    }
}

/// Lidinoid:
/// `(sin 2x cos y sin z + sin 2y cos z sin x + sin 2z cos x sin y)
///  - (cos 2x cos 2y + cos 2y cos 2z + cos 2z cos 2x)`
#[derive(Debug, Clone, Copy)]
pub struct Lidinoid {
    period: f32,
    thickness: f32,
    level: f32,
}

impl Lidinoid {
    pub fn new(period: f32, thickness: f32) -> Result<Self> {
        Ok(Self {
            period: check_period(period)?,
            thickness: check_thickness(thickness)?,
            level: 0.0,
        })
    }

    pattern_accessors!();
}

impl Field for Lidinoid {
    fn evaluate(&self, p: Vec3) -> f32 {
        let f = TAU / self.period;
        let (x, y, z) = (p.x * f, p.y * f, p.z * f);
        let (sx, cx) = x.sin_cos();
        let (sy, cy) = y.sin_cos();
        let (sz, cz) = z.sin_cos();
        let (s2x, c2x) = (2.0 * x).sin_cos();
        let (s2y, c2y) = (2.0 * y).sin_cos();
        let (s2z, c2z) = (2.0 * z).sin_cos();
        let raw = (s2x * cy * sz + s2y * cz * sx + s2z * cx * sy)
            - (c2x * c2y + c2y * c2z + c2z * c2x);
        // Steeper gradient than the single-frequency surfaces
        band((raw - self.level) / (4.0 * f), self.thickness)
    }

    fn bounds(&self) -> Aabb {
        Aabb::INFINITE
    }
}

/// Scherk: `sin z - sinh x * sinh y`
#[derive(Debug, Clone, Copy)]
pub struct Scherk {
    period: f32,
    thickness: f32,
    level: f32,
}

impl Scherk {
    pub fn new(period: f32, thickness: f32) -> Result<Self> {
        Ok(Self {
            period: check_period(period)?,
            thickness: check_thickness(thickness)?,
            level: 0.0,
        })
    }

    pattern_accessors!();
}

impl Field for Scherk {
    fn evaluate(&self, p: Vec3) -> f32 {
        let f = TAU / self.period;
        let (x, y, z) = (p.x * f, p.y * f, p.z * f);
        let raw = z.sin() - x.sinh() * y.sinh();
        band((raw - self.level) / f, self.thickness)
    }

    fn bounds(&self) -> Aabb {
        Aabb::INFINITE
    }
}

// ============================================================================
// Value noise band
// ============================================================================

/// Band around an isosurface of 3D value noise.
///
/// Not periodic despite the `period` parameter, which sets the feature
/// scale the same way it sets the cell size of the trig patterns.
pub struct NoiseBand {
    noise: Value,
    period: f32,
    thickness: f32,
    level: f32,
}

impl NoiseBand {
    pub fn new(period: f32, thickness: f32) -> Result<Self> {
        Self::with_seed(0, period, thickness)
    }

    pub fn with_seed(seed: u32, period: f32, thickness: f32) -> Result<Self> {
        Ok(Self {
            noise: Value::new(seed),
            period: check_period(period)?,
            thickness: check_thickness(thickness)?,
            level: 0.0,
        })
    }

    pattern_accessors!();
}

impl Field for NoiseBand {
    fn evaluate(&self, p: Vec3) -> f32 {
        let f = TAU / self.period;
        let raw = self.noise.get([
            f64::from(p.x) / f64::from(self.period),
            f64::from(p.y) / f64::from(self.period),
            f64::from(p.z) / f64::from(self.period),
        ]) as f32;
        band((raw - self.level) / f, self.thickness)
    }

    fn bounds(&self) -> Aabb {
        Aabb::INFINITE
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_points() -> Vec<Vec3> {
        vec![
            Vec3::ZERO,
            Vec3::new(0.37, 1.21, -0.66),
            Vec3::new(-2.4, 0.11, 3.9),
            Vec3::new(5.5, -5.5, 0.25),
        ]
    }

    #[test]
    fn patterns_are_periodic_along_each_axis() {
        let period = 2.5;
        let fields: Vec<Box<dyn Field>> = vec![
            Box::new(gyroid(period, 0.3).unwrap()),
            Box::new(schwarz_p(period, 0.3).unwrap()),
            Box::new(schwarz_d(period, 0.3).unwrap()),
            Box::new(lidinoid(period, 0.3).unwrap()),
        ];
        for field in &fields {
            for p in sample_points() {
                for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
                    let shifted = p + axis * period;
                    assert_relative_eq!(
                        field.evaluate(p),
                        field.evaluate(shifted),
                        epsilon = 1e-3
                    );
                }
            }
        }
    }

    #[test]
    fn scherk_is_periodic_along_z() {
        let period = 2.0;
        let s = scherk(period, 0.2).unwrap();
        for p in sample_points() {
            assert_relative_eq!(
                s.evaluate(p),
                s.evaluate(p + Vec3::Z * period),
                epsilon = 1e-3
            );
        }
    }

    #[test]
    fn gyroid_band_thickness_controls_membership() {
        // On the isosurface through the origin the banded distance is
        // exactly -thickness/2
        let g = gyroid(3.0, 0.5).unwrap();
        assert_relative_eq!(g.evaluate(Vec3::ZERO), -0.25);
        let thin = gyroid(3.0, 0.1).unwrap();
        assert_relative_eq!(thin.evaluate(Vec3::ZERO), -0.05);
    }

    #[test]
    fn level_shift_moves_the_isosurface() {
        let mut g = gyroid(3.0, 0.5).unwrap();
        g.set_level(0.4).unwrap();
        let f = TAU / 3.0;
        assert_relative_eq!(g.evaluate(Vec3::ZERO), (0.4 / f).abs() - 0.25);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(gyroid(0.0, 0.1).is_err());
        assert!(gyroid(-1.0, 0.1).is_err());
        assert!(gyroid(1.0, -0.1).is_err());
        assert!(noise_band(f32::NAN, 0.1).is_err());
    }

    #[test]
    fn patterns_have_no_intrinsic_bounds() {
        assert!(!gyroid(1.0, 0.1).unwrap().bounds().is_finite());
        assert!(!noise_band(1.0, 0.1).unwrap().bounds().is_finite());
    }

    #[test]
    fn noise_band_is_deterministic_per_seed() {
        let a = NoiseBand::with_seed(7, 2.0, 0.2).unwrap();
        let b = NoiseBand::with_seed(7, 2.0, 0.2).unwrap();
        let c = NoiseBand::with_seed(8, 2.0, 0.2).unwrap();
        let p = Vec3::new(0.3, 1.7, -0.9);
        assert_relative_eq!(a.evaluate(p), b.evaluate(p));
        // Different seeds should disagree somewhere
        let differs = sample_points()
            .iter()
            .any(|&q| (a.evaluate(q) - c.evaluate(q)).abs() > 1e-6);
        assert!(differs);
    }
}
