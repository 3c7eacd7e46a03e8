//! # voxform engine
//!
//! Orchestration layer over `voxform-core`: scene assembly, the
//! distance-field cache, and the mesh-to-distance-field pipeline.
//!
//! ## Example
//!
//! ```ignore
//! use voxform_engine::{DistanceFieldCache, Scene, load_model_distance, ModelDistanceConfig};
//! use voxform_core::prelude::*;
//!
//! let cache = DistanceFieldCache::new();
//! let model = load_model_distance(&cache, &loader, &transform,
//!     "pendant.stl".as_ref(), &ModelDistanceConfig::default())?;
//!
//! let shape = model.field.clone().smooth_union(sphere(2.0), 0.5)?;
//! let scene = Scene::with_voxel_size(shape, model.bounds, 0.1)?;
//! let grid = scene.rasterize()?;
//! ```

pub mod cache;
pub mod model;
pub mod scene;

// Re-export commonly used types from the core
pub use voxform_core::field::{Aabb, Field, FieldExt, FieldNode};
pub use voxform_core::grid::VoxelGrid;
pub use voxform_core::raster::{CancelToken, rasterize, rasterize_with};

// Re-export our own types
pub use cache::{CacheEntry, CacheError, DistanceFieldCache};
pub use model::{
    DistanceTransform, MeshRasterizer, ModelDistanceConfig, SVR, dist_data_key,
    load_model_distance,
};
pub use scene::{MaterialTag, Scene, SceneError};
