//! Core abstractions for meshpipe.
//!
//! This crate provides the types shared by every pipeline stage:
//! - [`GeometryDescriptor`] and its variants (point clouds, meshes, voxel grids, line sets)
//! - [`GeometryEngine`], the injected capability for sampling, reconstruction and voxelization
//! - [`PipelineConfig`] and the error types

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder-style methods return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Geometry code converts between index and float types
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]

pub mod axis;
pub mod bounds;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod half_space;
pub mod summary;

pub use axis::Axis;
pub use bounds::Aabb;
pub use config::PipelineConfig;
pub use engine::{
    GeometryEngine, NormalSearch, PoissonParams, SurfaceReconstruction, MAX_GRID_CELLS_PER_SIDE,
    MAX_RECONSTRUCTION_DEPTH,
};
pub use error::{check_attribute_len, EngineError, EngineResult, PipelineError, Result};
pub use geometry::{
    Geometry, GeometryDescriptor, LineSet, PointCloud, TriangleMesh, Voxel, VoxelGrid,
    DEGENERATE_AREA_EPSILON, DUPLICATE_VERTEX_EPSILON,
};
pub use half_space::{HalfSpace, KeepSide};
pub use summary::GeometrySummary;

// Re-export glam types for convenience
pub use glam::{DVec3, IVec3};
