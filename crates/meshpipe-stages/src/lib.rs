//! Pipeline stages for meshpipe.
//!
//! Every stage is a function from descriptors plus scalar parameters to new
//! descriptors. Stages that need sampling, normals, reconstruction or
//! voxelization take the [`GeometryEngine`](meshpipe_core::GeometryEngine)
//! as an argument and never reimplement those primitives.
//!
//! In pipeline order:
//! - [`source`]: load the input mesh, or substitute a box
//! - [`sampling`]: area-weighted surface sampling with a fixed budget
//! - [`reconstruction`]: normals, implicit reconstruction, density trim, cleanup
//! - [`voxelization`]: adaptive voxel size from the bounding-box diagonal
//! - [`clipping`]: half-space clipping and the clip-plane marker
//! - [`color_mapping`]: axis heat map
//! - [`extremum`]: min/max markers and the coordinate frame

// Documentation lints - stage errors are documented on PipelineError
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]

pub mod clipping;
pub mod color_mapping;
pub mod extremum;
pub mod reconstruction;
pub mod sampling;
pub mod source;
pub mod voxelization;

#[cfg(test)]
mod test_support;

pub use clipping::{clip_half_space, clip_plane_marker, clip_points, CLIP_PLANE_COLOR};
pub use color_mapping::{color_by_axis, heat_map_color, normalized_axis_values};
pub use extremum::{
    annotate_extrema, extremum_indices, ExtremaAnnotation, MAX_MARKER_COLOR, MIN_MARKER_COLOR,
};
pub use reconstruction::{
    cleanup_mesh, density_quantile, reconstruct, CleanupReport, Reconstruction,
    ReconstructionParams,
};
pub use sampling::sample_point_cloud;
pub use source::{fallback_mesh, load_mesh_or_default, SourceMesh};
pub use voxelization::{adaptive_voxel_size, voxelize, Voxelization, MIN_DIAGONAL};
