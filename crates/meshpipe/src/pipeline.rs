//! Sequencing of the pipeline stages.

use std::path::Path;

use meshpipe_core::{GeometryEngine, PipelineConfig, PointCloud, Result, TriangleMesh};
use meshpipe_stages::{
    annotate_extrema, clip_half_space, clip_plane_marker, color_by_axis, load_mesh_or_default,
    reconstruct, sample_point_cloud, voxelize, ExtremaAnnotation, Reconstruction,
    ReconstructionParams, SourceMesh, Voxelization,
};

/// Every descriptor produced by one run, in stage order.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// The loaded mesh, or the fallback box.
    pub source: SourceMesh,
    /// Points sampled from the source surface, without normals.
    pub sampled: PointCloud,
    /// Reconstructed mesh plus the oriented cloud it was built from.
    pub reconstruction: Reconstruction,
    pub voxelization: Voxelization,
    /// Slab marking the clipping plane.
    pub clip_plane: TriangleMesh,
    /// The oriented cloud restricted to the kept half-space.
    pub clipped: PointCloud,
    /// The oriented cloud with heat-map colors.
    pub colored: PointCloud,
    pub extrema: ExtremaAnnotation,
}

impl PipelineOutput {
    /// The cloud consumed by every stage after reconstruction.
    pub fn oriented_cloud(&self) -> &PointCloud {
        &self.reconstruction.oriented_cloud
    }
}

/// A validated configuration bound to a geometry engine.
///
/// # Example
///
/// ```no_run
/// use meshpipe::{NativeEngine, Pipeline, PipelineConfig};
///
/// let pipeline = Pipeline::new(NativeEngine::new(), PipelineConfig::default())?;
/// let output = pipeline.run("finn.obj")?;
/// println!("{} voxels", output.voxelization.grid.len());
/// # Ok::<(), meshpipe::PipelineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline<E> {
    engine: E,
    config: PipelineConfig,
}

impl<E: GeometryEngine> Pipeline<E> {
    /// Creates a pipeline, rejecting out-of-range configuration values.
    pub fn new(engine: E, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { engine, config })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage once on the mesh at `path`.
    ///
    /// A mesh that cannot be loaded is replaced by the fallback box, so the
    /// only errors are degenerate intermediate geometry and engine failures.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<PipelineOutput> {
        let config = &self.config;
        let engine = &self.engine;

        let source = load_mesh_or_default(engine, path.as_ref(), config.fallback_box_size);
        let sampled = sample_point_cloud(engine, &source.mesh, config.sample_count)?;
        let reconstruction = reconstruct(
            engine,
            &sampled,
            &ReconstructionParams::from_config(config),
        )?;
        let cloud = &reconstruction.oriented_cloud;

        let voxelization = voxelize(engine, cloud, config.voxel_resolution_divisor)?;

        let half_space = config.clip_half_space();
        let clip_plane = clip_plane_marker(
            cloud,
            &half_space,
            config.clip_plane_padding,
            config.clip_plane_thickness,
        )?;
        let clipped = clip_half_space(cloud, &half_space)?;

        let colored = color_by_axis(cloud, config.color_axis)?;
        let extrema = annotate_extrema(
            cloud,
            config.extremum_axis,
            config.marker_size_ratio,
            config.frame_size_ratio,
        )?;

        log::info!(
            "pipeline finished{}",
            if source.fallback_used {
                " (fallback mesh)"
            } else {
                ""
            }
        );
        Ok(PipelineOutput {
            source,
            sampled,
            reconstruction,
            voxelization,
            clip_plane,
            clipped,
            colored,
            extrema,
        })
    }
}
