//! Surface reconstruction stage.
//!
//! Normals are estimated and oriented, the engine reconstructs a candidate
//! surface with a per-vertex density field, poorly supported vertices are
//! trimmed at a density quantile, and the result goes through the mesh
//! cleanup passes in a fixed order.

use meshpipe_core::{
    check_attribute_len, GeometryEngine, NormalSearch, PipelineConfig, PipelineError,
    PoissonParams, PointCloud, Result, SurfaceReconstruction, TriangleMesh,
};

/// Parameters of [`reconstruct`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconstructionParams {
    /// Neighbourhood for normal estimation.
    pub normal_search: NormalSearch,
    /// Neighbours used to propagate normal orientation.
    pub orientation_k: usize,
    /// Parameters forwarded to the reconstructor.
    pub poisson: PoissonParams,
    /// Quantile of the density field below which vertices are removed.
    pub density_quantile: f64,
}

impl ReconstructionParams {
    /// Extracts the reconstruction parameters from a pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            normal_search: NormalSearch {
                radius: config.normal_radius,
                max_nn: config.normal_max_nn,
            },
            orientation_k: config.orientation_k,
            poisson: PoissonParams {
                depth: config.reconstruction_depth,
                width: config.reconstruction_width,
                scale: config.reconstruction_scale,
                linear_fit: config.reconstruction_linear_fit,
            },
            density_quantile: config.density_quantile,
        }
    }
}

impl Default for ReconstructionParams {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// How many elements each cleanup step removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupReport {
    pub low_density_vertices: usize,
    pub degenerate_triangles: usize,
    pub duplicated_triangles: usize,
    pub duplicated_vertices: usize,
    pub non_manifold_triangles: usize,
}

/// Output of [`reconstruct`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    /// The input cloud carrying oriented normals.
    pub oriented_cloud: PointCloud,
    /// The trimmed and cleaned surface.
    pub mesh: TriangleMesh,
    /// Density value below which vertices were removed.
    pub density_threshold: f64,
    /// Elements removed by each cleanup step.
    pub report: CleanupReport,
}

/// The `q`-quantile of `values`, interpolating linearly between order
/// statistics. Returns `None` for an empty slice.
pub fn density_quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Runs the cleanup passes in order: degenerate triangles, duplicated
/// triangles, duplicated vertices, non-manifold edges.
///
/// Each pass sees the output of the previous one, so a zero-area triangle
/// is gone before duplicates are looked for.
pub fn cleanup_mesh<E>(engine: &E, mesh: &mut TriangleMesh) -> CleanupReport
where
    E: GeometryEngine + ?Sized,
{
    let degenerate_triangles = engine.remove_degenerate_triangles(mesh);
    let duplicated_triangles = engine.remove_duplicated_triangles(mesh);
    let duplicated_vertices = engine.remove_duplicated_vertices(mesh);
    let non_manifold_triangles = engine.remove_non_manifold_edges(mesh);
    CleanupReport {
        low_density_vertices: 0,
        degenerate_triangles,
        duplicated_triangles,
        duplicated_vertices,
        non_manifold_triangles,
    }
}

/// Reconstructs a cleaned surface from a point cloud.
pub fn reconstruct<E>(
    engine: &E,
    cloud: &PointCloud,
    params: &ReconstructionParams,
) -> Result<Reconstruction>
where
    E: GeometryEngine + ?Sized,
{
    if cloud.points().is_empty() {
        return Err(PipelineError::EmptyPointCloud);
    }

    let with_normals = engine.estimate_normals(cloud, &params.normal_search)?;
    let oriented_cloud = engine.orient_normals_consistent(&with_normals, params.orientation_k)?;
    let SurfaceReconstruction {
        mut mesh,
        densities,
    } = engine.reconstruct_surface(&oriented_cloud, &params.poisson)?;
    check_attribute_len("densities", mesh.num_vertices(), densities.len())?;

    let density_threshold = density_quantile(&densities, params.density_quantile)
        .ok_or(PipelineError::DegenerateReconstruction { threshold: 0.0 })?;
    let mask: Vec<bool> = densities.iter().map(|&d| d < density_threshold).collect();
    let low_density_vertices = engine.remove_vertices_by_mask(&mut mesh, &mask)?;
    if mesh.num_vertices() == 0 {
        return Err(PipelineError::DegenerateReconstruction {
            threshold: density_threshold,
        });
    }
    log::debug!(
        "density threshold {density_threshold:.6} removed {low_density_vertices} vertices"
    );

    let report = CleanupReport {
        low_density_vertices,
        ..cleanup_mesh(engine, &mut mesh)
    };
    log::info!(
        "reconstructed mesh: {} vertices, {} triangles ({report:?})",
        mesh.num_vertices(),
        mesh.num_triangles()
    );

    Ok(Reconstruction {
        oriented_cloud,
        mesh,
        density_threshold,
        report,
    })
}
