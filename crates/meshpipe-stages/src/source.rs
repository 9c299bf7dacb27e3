//! Input mesh loading with a synthetic fallback.

use std::path::Path;

use glam::DVec3;
use meshpipe_core::{GeometryEngine, PipelineError, TriangleMesh};

/// The mesh the pipeline starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMesh {
    pub mesh: TriangleMesh,
    /// Whether the fallback box replaced the requested file.
    pub fallback_used: bool,
}

/// A cube of side `size` centered on the origin.
pub fn fallback_mesh(size: f64) -> TriangleMesh {
    TriangleMesh::create_centered_box(DVec3::splat(size), DVec3::ZERO)
}

/// Loads `path` through the engine.
///
/// A failed load, or a file without vertices, is a
/// [`PipelineError::LoadFailure`]: it is logged and the mesh is replaced by
/// [`fallback_mesh`]. This stage never fails.
pub fn load_mesh_or_default<E>(engine: &E, path: &Path, fallback_size: f64) -> SourceMesh
where
    E: GeometryEngine + ?Sized,
{
    let failure = match engine.load_mesh(path) {
        Ok(mesh) if mesh.num_vertices() > 0 => {
            log::info!(
                "loaded {}: {} vertices, {} triangles",
                path.display(),
                mesh.num_vertices(),
                mesh.num_triangles()
            );
            return SourceMesh {
                mesh,
                fallback_used: false,
            };
        }
        Ok(_) => "mesh has no vertices".to_string(),
        Err(e) => e.to_string(),
    };

    let error = PipelineError::LoadFailure {
        path: path.display().to_string(),
        reason: failure,
    };
    log::warn!("{error}; using a box of side {fallback_size}");
    SourceMesh {
        mesh: fallback_mesh(fallback_size),
        fallback_used: true,
    }
}
