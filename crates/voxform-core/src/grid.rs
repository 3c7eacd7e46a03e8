//! Dense voxel grids
//!
//! A grid stores one scalar per voxel over a regular lattice: sample
//! `(i, j, k)` lives at `origin + (i, j, k) * voxel_size`. The rasterizer
//! produces grids whose origin sits half a voxel inside the requested
//! bounds, so lattice points coincide with cell centers.

use glam::Vec3;

use crate::error::{Error, Result};
use crate::field::Aabb;

/// Dense 3D array of scalar samples with an origin and uniform spacing
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    nx: usize,
    ny: usize,
    nz: usize,
    origin: Vec3,
    voxel_size: f32,
    data: Vec<f32>,
}

impl VoxelGrid {
    /// Allocate a zero-filled grid covering `bounds` at the given voxel
    /// size; dimensions are `ceil(extent / voxel_size)` per axis
    pub fn new(bounds: Aabb, voxel_size: f32) -> Result<Self> {
        if !voxel_size.is_finite() || voxel_size <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "voxel size must be > 0, got {voxel_size}"
            )));
        }
        if !bounds.is_finite() || bounds.is_empty() {
            return Err(Error::InvalidParameter(
                "grid bounds must be finite and non-empty".into(),
            ));
        }
        let size = bounds.size();
        let nx = (size.x / voxel_size).ceil().max(1.0) as usize;
        let ny = (size.y / voxel_size).ceil().max(1.0) as usize;
        let nz = (size.z / voxel_size).ceil().max(1.0) as usize;
        let origin = bounds.min + Vec3::splat(0.5 * voxel_size);
        Ok(Self {
            nx,
            ny,
            nz,
            origin,
            voxel_size,
            data: vec![0.0; nx * ny * nz],
        })
    }

    /// Wrap an existing sample buffer; the length must match the
    /// dimensions exactly
    pub fn from_data(
        dims: (usize, usize, usize),
        origin: Vec3,
        voxel_size: f32,
        data: Vec<f32>,
    ) -> Result<Self> {
        let (nx, ny, nz) = dims;
        if data.len() != nx * ny * nz {
            return Err(Error::InvalidParameter(format!(
                "grid data length {} does not match {}x{}x{}",
                data.len(),
                nx,
                ny,
                nz
            )));
        }
        if !voxel_size.is_finite() || voxel_size <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "voxel size must be > 0, got {voxel_size}"
            )));
        }
        Ok(Self {
            nx,
            ny,
            nz,
            origin,
            voxel_size,
            data,
        })
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Bounds of the sampled region, half a voxel outside the outermost
    /// lattice points
    pub fn bounds(&self) -> Aabb {
        let half = Vec3::splat(0.5 * self.voxel_size);
        let extent = Vec3::new(
            (self.nx - 1) as f32,
            (self.ny - 1) as f32,
            (self.nz - 1) as f32,
        ) * self.voxel_size;
        Aabb::new(self.origin - half, self.origin + extent + half)
    }

    fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.nx * (j + self.ny * k)
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> f32 {
        self.data[self.index(i, j, k)]
    }

    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f32) {
        let idx = self.index(i, j, k);
        self.data[idx] = value;
    }

    /// World position of lattice point `(i, j, k)`
    pub fn position(&self, i: usize, j: usize, k: usize) -> Vec3 {
        self.origin + Vec3::new(i as f32, j as f32, k as f32) * self.voxel_size
    }

    /// Trilinear interpolation between the eight surrounding samples;
    /// queries outside the lattice clamp to the border samples
    pub fn sample(&self, p: Vec3) -> f32 {
        let g = (p - self.origin) / self.voxel_size;
        let base = g.floor();
        let t = g - base;

        let clamp_axis = |v: f32, n: usize| -> usize {
            if v < 0.0 {
                0
            } else {
                (v as usize).min(n - 1)
            }
        };
        let i0 = clamp_axis(base.x, self.nx);
        let j0 = clamp_axis(base.y, self.ny);
        let k0 = clamp_axis(base.z, self.nz);
        let i1 = (i0 + 1).min(self.nx - 1);
        let j1 = (j0 + 1).min(self.ny - 1);
        let k1 = (k0 + 1).min(self.nz - 1);
        let t = t.clamp(Vec3::ZERO, Vec3::ONE);

        let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
        let c00 = lerp(self.get(i0, j0, k0), self.get(i1, j0, k0), t.x);
        let c10 = lerp(self.get(i0, j1, k0), self.get(i1, j1, k0), t.x);
        let c01 = lerp(self.get(i0, j0, k1), self.get(i1, j0, k1), t.x);
        let c11 = lerp(self.get(i0, j1, k1), self.get(i1, j1, k1), t.x);
        let c0 = lerp(c00, c10, t.y);
        let c1 = lerp(c01, c11, t.y);
        lerp(c0, c1, t.z)
    }

    /// Fill every sample from a function of the lattice position
    pub fn fill_with(&mut self, f: impl Fn(Vec3) -> f32) {
        for k in 0..self.nz {
            for j in 0..self.ny {
                for i in 0..self.nx {
                    let p = self.position(i, j, k);
                    let idx = self.index(i, j, k);
                    self.data[idx] = f(p);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
