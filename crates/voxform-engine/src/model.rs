//! Mesh-derived distance fields
//!
//! Loading a mesh and turning it into a signed-distance grid is the job
//! of external collaborators; this module defines their contracts and
//! wires them through the cache into a ready-to-compose field node. The
//! transform's output is fixed-point in `[-svr, svr]`; an affine value
//! map recovers physical distances.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;
use voxform_core::field::FieldNode;
use voxform_core::field::grid_field::{GridField, ValueMap};
use voxform_core::grid::VoxelGrid;

use crate::cache::{CacheEntry, CacheError, DistanceFieldCache};

/// Default fixed-point range of the distance transform output
pub const SVR: f32 = 255.0;

/// Rasterizes a mesh file into a dense density grid with its bounds
pub trait MeshRasterizer: Send + Sync {
    fn load(&self, path: &Path, voxel_size: f32, margin: f32) -> anyhow::Result<VoxelGrid>;
}

/// Converts a density grid into a discretized signed-distance grid,
/// fixed-point in `[-svr, svr]`
pub trait DistanceTransform: Send + Sync {
    fn execute(&self, grid: &VoxelGrid) -> anyhow::Result<VoxelGrid>;
}

/// Sampling parameters for mesh-derived distance fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelDistanceConfig {
    /// Grid spacing in world units
    pub voxel_size: f32,
    /// Largest distance the transform resolves, inside and outside
    pub max_dist: f32,
    /// Fixed-point range of the transform output
    pub svr: f32,
}

impl Default for ModelDistanceConfig {
    fn default() -> Self {
        Self {
            voxel_size: 0.1,
            max_dist: 1.0,
            svr: SVR,
        }
    }
}

impl ModelDistanceConfig {
    /// Loader margin around the mesh so the transform has room for the
    /// full distance band
    pub fn margin(&self) -> f32 {
        self.max_dist + 2.0 * self.voxel_size
    }
}

/// Deterministic cache key for a model distance field.
///
/// The key carries the source identity and every sampling parameter that
/// changes the result; the cached entry holds both the field and its
/// grid bounds.
pub fn dist_data_key(path: &Path, config: &ModelDistanceConfig) -> String {
    format!(
        "distData:{}_{}_{}",
        path.display(),
        config.voxel_size,
        config.max_dist
    )
}

/// Load a mesh-derived distance field through the cache.
///
/// On a miss this runs loader and transform (expensive, possibly
/// seconds) exactly once per key, wraps the fixed-point grid with the
/// `value/svr * max_dist` remap, and stores the `(field, bounds)` pair.
/// Concurrent callers on the same key share one computation.
pub fn load_model_distance(
    cache: &DistanceFieldCache,
    loader: &dyn MeshRasterizer,
    transform: &dyn DistanceTransform,
    path: &Path,
    config: &ModelDistanceConfig,
) -> Result<Arc<CacheEntry>, CacheError> {
    let key = dist_data_key(path, config);
    cache.get_or_compute(&key, || {
        let started = Instant::now();
        let density = loader.load(path, config.voxel_size, config.margin())?;
        let distances = transform.execute(&density)?;
        let bounds = distances.bounds();
        let map = ValueMap::fixed_point(config.svr, config.max_dist)?;
        let field = FieldNode::new(GridField::new(Arc::new(distances), map));
        info!(
            path = %path.display(),
            voxel_size = config.voxel_size,
            max_dist = config.max_dist,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "computed model distance field"
        );
        Ok(CacheEntry::new(field, bounds))
    })
}

// ============================================================================
// Tests
// ============================================================================
