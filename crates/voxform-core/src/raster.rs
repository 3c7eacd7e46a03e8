//! Grid rasterization
//!
//! Samples a root field over a bounding box at a fixed voxel size into a
//! dense grid. Every voxel is sampled at its cell center and no voxel
//! depends on any other, so the work is parallelized over the flat voxel
//! index; the collected output is independent of the partitioning and
//! thread count. On failure or cancellation no partial grid is returned.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec3;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::field::{Aabb, Field};
use crate::grid::VoxelGrid;

/// Shared flag for aborting a rasterization job.
///
/// Cancellation is cooperative: the rasterizer polls the flag and bails
/// out with [`Error::Cancelled`], discarding all work done so far.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; visible to every clone of the token
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Rasterize `field` over `bounds` at the given voxel size
pub fn rasterize(field: &(impl Field + ?Sized), bounds: Aabb, voxel_size: f32) -> Result<VoxelGrid> {
    rasterize_with(field, bounds, voxel_size, &CancelToken::new())
}

/// Rasterize with an external cancellation token.
///
/// Fails with [`Error::MissingBounds`] when the field has no finite
/// bounds of its own: a bare pattern or plane must be intersected with a
/// bounded shape before it can be rasterized.
pub fn rasterize_with(
    field: &(impl Field + ?Sized),
    bounds: Aabb,
    voxel_size: f32,
    cancel: &CancelToken,
) -> Result<VoxelGrid> {
    if !voxel_size.is_finite() || voxel_size <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "voxel size must be > 0, got {voxel_size}"
        )));
    }
    if !bounds.is_finite() || bounds.is_empty() {
        return Err(Error::InvalidParameter(
            "rasterization bounds must be finite and non-empty".into(),
        ));
    }
    if !field.bounds().is_finite() {
        return Err(Error::MissingBounds(
            "field is unbounded; intersect it with a bounded shape first".into(),
        ));
    }

    let mut grid = VoxelGrid::new(bounds, voxel_size)?;
    let (nx, ny, _nz) = grid.dims();
    let origin = grid.origin();

    // Contiguous z-slabs; each slab writes only its own region, so the
    // result is independent of how rayon schedules them
    grid.data_mut()
        .par_chunks_mut(nx * ny)
        .enumerate()
        .try_for_each(|(k, slab)| {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            for j in 0..ny {
                for i in 0..nx {
                    let p = origin + Vec3::new(i as f32, j as f32, k as f32) * voxel_size;
                    let value = field.evaluate(p);
                    if value.is_nan() {
                        return Err(Error::Rasterize(format!(
                            "field evaluated to NaN at voxel ({i}, {j}, {k})"
                        )));
                    }
                    slab[i + nx * j] = value;
                }
            }
            Ok(())
        })?;

    Ok(grid)
}

// ============================================================================
// Tests
// ============================================================================
