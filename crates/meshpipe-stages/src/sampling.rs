//! Surface sampling stage.

use meshpipe_core::{EngineError, GeometryEngine, PipelineError, PointCloud, Result, TriangleMesh};

/// Samples exactly `count` points from the mesh surface, area-weighted.
///
/// The mesh must have triangles; an engine that returns a different number
/// of points is reported as an engine failure.
pub fn sample_point_cloud<E>(engine: &E, mesh: &TriangleMesh, count: usize) -> Result<PointCloud>
where
    E: GeometryEngine + ?Sized,
{
    if mesh.num_triangles() == 0 {
        return Err(PipelineError::EmptyMesh);
    }
    if count == 0 {
        return Err(PipelineError::InvalidConfig(
            "sample count must be at least 1".into(),
        ));
    }

    let cloud = engine.sample_points_uniformly(mesh, count)?;
    if cloud.len() != count {
        return Err(EngineError::failed(
            "sample_points_uniformly",
            format!("returned {} points, expected {count}", cloud.len()),
        )
        .into());
    }

    log::info!(
        "sampled {count} points from {} triangles",
        mesh.num_triangles()
    );
    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeEngine;

    #[test]
    fn test_exact_count() {
        let engine = FakeEngine::default();
        let mesh = TriangleMesh::create_box(1.0, 1.0, 1.0);
        let cloud = sample_point_cloud(&engine, &mesh, 15_000).unwrap();
        assert_eq!(cloud.len(), 15_000);
    }

    #[test]
    fn test_mesh_without_faces() {
        let engine = FakeEngine::default();
        let result = sample_point_cloud(&engine, &TriangleMesh::default(), 10);
        assert!(matches!(result, Err(PipelineError::EmptyMesh)));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_wrong_count_from_engine() {
        let engine = FakeEngine {
            short_sample: true,
            ..FakeEngine::default()
        };
        let mesh = TriangleMesh::create_box(1.0, 1.0, 1.0);
        let result = sample_point_cloud(&engine, &mesh, 10);
        assert!(matches!(result, Err(PipelineError::ExternalEngine(_))));
    }

    #[test]
    fn test_zero_budget() {
        let engine = FakeEngine::default();
        let mesh = TriangleMesh::create_box(1.0, 1.0, 1.0);
        assert!(matches!(
            sample_point_cloud(&engine, &mesh, 0),
            Err(PipelineError::InvalidConfig(_))
        ));
    }
}
