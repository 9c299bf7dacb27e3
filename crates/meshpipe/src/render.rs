//! Scenes and the sinks that display them.
//!
//! Rendering is outside the pipeline: a [`RenderSink`] receives titled
//! groups of geometry and decides what to do with them. [`LogSink`] reports
//! them through `log`.

use meshpipe_core::{Geometry, GeometryDescriptor};

use crate::pipeline::PipelineOutput;

/// A titled group of geometry shown together.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub title: String,
    pub geometries: Vec<GeometryDescriptor>,
}

impl Scene {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            geometries: Vec::new(),
        }
    }

    /// Adds a geometry to the scene.
    #[must_use]
    pub fn with(mut self, geometry: impl Into<GeometryDescriptor>) -> Self {
        self.geometries.push(geometry.into());
        self
    }
}

/// Receives scenes for display.
pub trait RenderSink {
    fn show(&mut self, scene: &Scene);
}

/// Collects scenes instead of showing them.
impl RenderSink for Vec<Scene> {
    fn show(&mut self, scene: &Scene) {
        self.push(scene.clone());
    }
}

/// Logs each scene's title and the summary of every geometry in it.
#[derive(Debug, Default)]
pub struct LogSink {
    shown: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scenes shown so far.
    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl RenderSink for LogSink {
    fn show(&mut self, scene: &Scene) {
        self.shown += 1;
        log::info!("=== {} ===", scene.title);
        for geometry in &scene.geometries {
            log::info!("  {}", geometry.summary());
        }
    }
}

impl PipelineOutput {
    /// The seven scenes of a run, one per stage.
    pub fn scenes(&self) -> Vec<Scene> {
        let cloud = self.oriented_cloud();
        vec![
            Scene::new("Original Model").with(self.source.mesh.clone()),
            Scene::new("Point Cloud").with(self.sampled.clone()),
            Scene::new("Reconstructed Mesh").with(self.reconstruction.mesh.clone()),
            Scene::new(format!(
                "Voxelized Model (size {:.3})",
                self.voxelization.voxel_size
            ))
            .with(self.voxelization.grid.clone()),
            Scene::new("Object with Clipping Plane")
                .with(cloud.clone())
                .with(self.clip_plane.clone()),
            Scene::new("Clipped Model").with(self.clipped.clone()),
            Scene::new("Extremes with Wireframe Cubes")
                .with(self.colored.clone())
                .with(self.extrema.min_marker.clone())
                .with(self.extrema.max_marker.clone())
                .with(self.extrema.frame.clone()),
        ]
    }
}

/// Hands every scene of `output` to `sink`, in stage order.
pub fn present<S>(output: &PipelineOutput, sink: &mut S)
where
    S: RenderSink + ?Sized,
{
    for scene in output.scenes() {
        sink.show(&scene);
    }
}

#[cfg(test)]
mod tests {
    use meshpipe_core::{DVec3, PointCloud, TriangleMesh};

    use super::*;

    #[test]
    fn test_scene_builder() {
        let scene = Scene::new("points")
            .with(PointCloud::new(vec![DVec3::ZERO]))
            .with(TriangleMesh::create_box(1.0, 1.0, 1.0));
        assert_eq!(scene.title, "points");
        assert_eq!(scene.geometries.len(), 2);
        assert_eq!(scene.geometries[1].type_name(), "TriangleMesh");
    }

    #[test]
    fn test_log_sink_counts_scenes() {
        let mut sink = LogSink::new();
        sink.show(&Scene::new("a"));
        sink.show(&Scene::new("b"));
        assert_eq!(sink.shown(), 2);
    }

    #[test]
    fn test_vec_sink_records() {
        let mut sink: Vec<Scene> = Vec::new();
        sink.show(&Scene::new("a").with(PointCloud::default()));
        assert_eq!(sink.len(), 1);
        assert!(sink[0].geometries[0].is_empty());
    }
}
