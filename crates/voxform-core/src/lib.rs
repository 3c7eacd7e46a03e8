//! # voxform core
//!
//! Procedural solid modeling through signed distance fields.
//!
//! Clients build a tree of implicit-surface nodes (primitives,
//! transforms, boolean combinators, periodic patterns, image reliefs,
//! grid-backed fields) and hand the root to the rasterizer, which samples
//! it into a dense voxel grid.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use voxform_core::prelude::*;
//!
//! // A sphere with a box cut out, rasterized at 0.5-unit voxels
//! let shape = sphere(25.0).subtract(box3(Vec3::new(25.0, 20.0, 5.0)));
//! let grid = rasterize(&shape, Aabb::cube(26.0), 0.5)?;
//! ```
//!
//! ## Units and Conventions
//!
//! - **Distances**: arbitrary units; negative inside, positive outside
//! - **Angles**: radians everywhere
//! - **Precision**: `f32` scalars, `glam` vectors
//! - **Evaluation**: pure per point; finalized trees are safe to share
//!   across threads

pub mod field;
pub mod grid;
pub mod raster;
pub mod transform;

mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    // Field tree construction
    pub use crate::field::{Aabb, Field, FieldExt, FieldNode, primitives::*};

    // Combinators and patterns
    pub use crate::field::bump::{BumpComposite, BumpMode};
    pub use crate::field::combine::{Intersection, Subtraction, Union};
    pub use crate::field::grid_field::{GridField, ValueMap};
    pub use crate::field::pattern::*;
    pub use crate::field::relief::{ImageRelief, Raster, open_raster};

    // Transforms
    pub use crate::transform::{
        Composite, PeriodicWrap, PlaneReflection, RingWrap, Rotation, Scaling, SphereInversion,
        Transform, Transformed, Translation,
    };

    // Grids and rasterization
    pub use crate::grid::VoxelGrid;
    pub use crate::raster::{CancelToken, rasterize, rasterize_with};

    // Math (re-export glam)
    pub use glam::{Quat, Vec2, Vec3};

    // Error handling
    pub use crate::{Error, Result};
}
