//! meshpipe: a geometric processing pipeline for surface meshes.
//!
//! One run turns a mesh into a point cloud, reconstructs a cleaned surface
//! from the cloud, voxelizes it, clips it against a half-space, colors it
//! along an axis and marks its extrema.
//!
//! # Quick Start
//!
//! ```no_run
//! use meshpipe::*;
//!
//! fn main() -> Result<()> {
//!     init();
//!
//!     let pipeline = Pipeline::new(NativeEngine::new(), PipelineConfig::default())?;
//!     let output = pipeline.run("finn.obj")?;
//!
//!     present(&output, &mut LogSink::new());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`meshpipe_core`]: descriptors, configuration, errors and the [`GeometryEngine`] trait
//! - [`meshpipe_engine`]: [`NativeEngine`], a pure-Rust implementation of the engine
//! - [`meshpipe_stages`]: the stage functions, each generic over the engine
//! - this crate: [`Pipeline`], the scenes of a run and the [`RenderSink`] trait

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod pipeline;
mod render;

pub use meshpipe_core::{
    Aabb, Axis, DVec3, EngineError, EngineResult, Geometry, GeometryDescriptor, GeometryEngine,
    GeometrySummary, HalfSpace, IVec3, KeepSide, LineSet, NormalSearch, PipelineConfig,
    PipelineError, PoissonParams, PointCloud, Result, SurfaceReconstruction, TriangleMesh, Voxel,
    VoxelGrid,
};
pub use meshpipe_engine::NativeEngine;
pub use meshpipe_stages as stages;
pub use meshpipe_stages::{
    CleanupReport, ExtremaAnnotation, Reconstruction, SourceMesh, Voxelization,
};

pub use pipeline::{Pipeline, PipelineOutput};
pub use render::{present, LogSink, RenderSink, Scene};

/// Installs the `env_logger` backend.
///
/// Safe to call more than once; only the first call installs a logger.
pub fn init() {
    if env_logger::try_init().is_ok() {
        log::debug!("meshpipe logging initialized");
    }
}
