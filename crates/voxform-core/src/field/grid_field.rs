//! Grid-backed fields
//!
//! Wraps a precomputed distance grid (typically derived from a mesh by an
//! external distance transform) as a continuous field: trilinear
//! interpolation between samples plus an affine remap from stored units
//! to physical distances.

use std::sync::Arc;

use glam::Vec3;

use super::{Aabb, Field};
use crate::error::{Error, Result};
use crate::grid::VoxelGrid;

/// Affine remap from stored sample units to physical distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueMap {
    pub scale: f32,
    pub offset: f32,
}

impl ValueMap {
    pub const IDENTITY: ValueMap = ValueMap {
        scale: 1.0,
        offset: 0.0,
    };

    pub fn new(scale: f32, offset: f32) -> Self {
        Self { scale, offset }
    }

    /// Remap for fixed-point distance grids storing `[-svr, svr]` for
    /// physical `[-max_dist, max_dist]`.
    ///
    /// The linear range is a workaround inherited from the transform's
    /// output convention, not a verified exact inverse; treat `svr` and
    /// `max_dist` as configuration.
    pub fn fixed_point(svr: f32, max_dist: f32) -> Result<Self> {
        if !svr.is_finite() || svr <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "fixed-point range must be > 0, got {svr}"
            )));
        }
        Ok(Self {
            scale: max_dist / svr,
            offset: 0.0,
        })
    }

    pub fn apply(&self, value: f32) -> f32 {
        value * self.scale + self.offset
    }
}

/// Continuous field over a shared distance grid
#[derive(Clone)]
pub struct GridField {
    grid: Arc<VoxelGrid>,
    map: ValueMap,
}

impl GridField {
    pub fn new(grid: Arc<VoxelGrid>, map: ValueMap) -> Self {
        Self { grid, map }
    }

    pub fn grid(&self) -> &Arc<VoxelGrid> {
        &self.grid
    }

    pub fn value_map(&self) -> ValueMap {
        self.map
    }
}

impl Field for GridField {
    fn evaluate(&self, p: Vec3) -> f32 {
        self.map.apply(self.grid.sample(p))
    }

    fn bounds(&self) -> Aabb {
        self.grid.bounds()
    }
}

// ============================================================================
// Tests
// ============================================================================
