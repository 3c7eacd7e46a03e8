//! Scene representation
//!
//! A Scene pairs a root field with its bounds and an opaque material
//! list for downstream renderers. The core never interprets materials;
//! they ride along as tags.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use voxform_core::field::{Aabb, Field, FieldNode};
use voxform_core::grid::VoxelGrid;
use voxform_core::raster::{CancelToken, rasterize_with};

/// Errors that can occur when assembling or rasterizing a scene
#[derive(Error, Debug)]
pub enum SceneError {
    /// Scene bounds must be finite and non-empty
    #[error("Scene bounds must be finite and non-empty")]
    InvalidBounds,

    /// Rasterization was requested without a voxel size
    #[error("Scene has no voxel size")]
    NoVoxelSize,

    /// Rasterization failed
    #[error(transparent)]
    Raster(#[from] voxform_core::Error),
}

/// Opaque material/light tag attached to a scene, not interpreted here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialTag(pub String);

impl MaterialTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// A complete scene: root field, bounds, optional voxel size, materials
#[derive(Clone)]
pub struct Scene {
    /// The root field
    pub field: FieldNode,

    /// Region of interest for rasterization or rendering
    pub bounds: Aabb,

    /// Preferred voxel size for grid consumers
    pub voxel_size: Option<f32>,

    /// Opaque material/light tags for downstream renderers
    pub materials: Vec<MaterialTag>,
}

impl Scene {
    /// Create a new scene over finite bounds
    pub fn new(field: FieldNode, bounds: Aabb) -> Result<Self, SceneError> {
        if !bounds.is_finite() || bounds.is_empty() {
            return Err(SceneError::InvalidBounds);
        }
        Ok(Self {
            field,
            bounds,
            voxel_size: None,
            materials: Vec::new(),
        })
    }

    /// Create a scene with a preferred voxel size
    pub fn with_voxel_size(
        field: FieldNode,
        bounds: Aabb,
        voxel_size: f32,
    ) -> Result<Self, SceneError> {
        let mut scene = Self::new(field, bounds)?;
        scene.voxel_size = Some(voxel_size);
        Ok(scene)
    }

    /// Attach an opaque material tag
    pub fn add_material(&mut self, material: MaterialTag) {
        self.materials.push(material);
    }

    /// Builder-style [`Scene::add_material`]
    pub fn with_material(mut self, material: MaterialTag) -> Self {
        self.add_material(material);
        self
    }

    /// Rasterize the scene at its preferred voxel size
    pub fn rasterize(&self) -> Result<VoxelGrid, SceneError> {
        self.rasterize_with(&CancelToken::new())
    }

    /// Rasterize with an external cancellation token
    pub fn rasterize_with(&self, cancel: &CancelToken) -> Result<VoxelGrid, SceneError> {
        let voxel_size = self.voxel_size.ok_or(SceneError::NoVoxelSize)?;
        Ok(rasterize_with(
            &self.field,
            self.bounds,
            voxel_size,
            cancel,
        )?)
    }

    /// Evaluate the root field at a point
    pub fn evaluate(&self, p: glam::Vec3) -> f32 {
        self.field.evaluate(p)
    }
}
