//! The geometry engine capability consumed by the pipeline stages.
//!
//! Stages never load, sample, estimate normals, reconstruct or voxelize by
//! themselves: they call a [`GeometryEngine`]. Tests inject engines that
//! return fixtures; `meshpipe-engine` provides a native implementation.

use std::path::Path;

use crate::error::{EngineResult, Result};
use crate::geometry::{PointCloud, TriangleMesh, VoxelGrid};

/// Hybrid neighbourhood query for normal estimation: at most `max_nn`
/// neighbours, none farther than `radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalSearch {
    /// Search radius.
    pub radius: f64,
    /// Maximum number of neighbours.
    pub max_nn: usize,
}

/// Deepest reconstruction grid accepted by configuration and engines.
pub const MAX_RECONSTRUCTION_DEPTH: u32 = 8;

/// Cells per side of the finest reconstruction grid, `2^MAX_RECONSTRUCTION_DEPTH`.
///
/// Engines that evaluate a dense grid clamp width-driven resolutions to this.
pub const MAX_GRID_CELLS_PER_SIDE: u32 = 1 << MAX_RECONSTRUCTION_DEPTH;

/// Parameters of the implicit surface reconstruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonParams {
    /// Grid depth: `2^depth` cells per side.
    pub depth: u32,
    /// Target cell width; overrides `depth` when positive.
    pub width: f64,
    /// Ratio between the reconstruction cube and the samples' bounding box.
    pub scale: f64,
    /// Place iso-vertices by linear interpolation instead of edge midpoints.
    pub linear_fit: bool,
}

impl Default for PoissonParams {
    fn default() -> Self {
        Self {
            depth: 6,
            width: 0.0,
            scale: 1.1,
            linear_fit: false,
        }
    }
}

/// Reconstructed surface plus the per-vertex support density.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceReconstruction {
    /// Candidate mesh.
    pub mesh: TriangleMesh,
    /// One density value per mesh vertex.
    pub densities: Vec<f64>,
}

/// External geometry services used by the pipeline.
///
/// All calls are blocking and are not retried; an `Err` aborts the run.
/// The cleanup primitives default to the [`TriangleMesh`] passes.
pub trait GeometryEngine {
    /// Loads a triangle mesh from disk.
    fn load_mesh(&self, path: &Path) -> EngineResult<TriangleMesh>;

    /// Samples `count` points uniformly per unit area of the mesh surface.
    fn sample_points_uniformly(&self, mesh: &TriangleMesh, count: usize)
        -> EngineResult<PointCloud>;

    /// Returns the cloud with freshly estimated normals.
    fn estimate_normals(&self, cloud: &PointCloud, search: &NormalSearch)
        -> EngineResult<PointCloud>;

    /// Returns the cloud with normals flipped into a consistent orientation.
    fn orient_normals_consistent(&self, cloud: &PointCloud, k: usize) -> EngineResult<PointCloud>;

    /// Reconstructs a surface from an oriented cloud.
    fn reconstruct_surface(
        &self,
        cloud: &PointCloud,
        params: &PoissonParams,
    ) -> EngineResult<SurfaceReconstruction>;

    /// Builds a voxel grid of cells of side `voxel_size` occupied by the cloud.
    fn voxelize(&self, cloud: &PointCloud, voxel_size: f64) -> EngineResult<VoxelGrid>;

    /// Removes masked vertices and the triangles using them.
    fn remove_vertices_by_mask(&self, mesh: &mut TriangleMesh, mask: &[bool]) -> Result<usize> {
        mesh.remove_vertices_by_mask(mask)
    }

    /// Removes zero-area and repeated-index triangles.
    fn remove_degenerate_triangles(&self, mesh: &mut TriangleMesh) -> usize {
        mesh.remove_degenerate_triangles()
    }

    /// Removes triangles repeating an earlier one up to rotation.
    fn remove_duplicated_triangles(&self, mesh: &mut TriangleMesh) -> usize {
        mesh.remove_duplicated_triangles()
    }

    /// Merges coincident vertices.
    fn remove_duplicated_vertices(&self, mesh: &mut TriangleMesh) -> usize {
        mesh.remove_duplicated_vertices()
    }

    /// Removes triangles until every edge has at most two.
    fn remove_non_manifold_edges(&self, mesh: &mut TriangleMesh) -> usize {
        mesh.remove_non_manifold_edges()
    }
}
