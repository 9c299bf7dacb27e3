//! Voxelization stage with a size that follows the model's scale.

use meshpipe_core::{Geometry, GeometryEngine, PipelineError, PointCloud, Result, VoxelGrid};

/// Bounding-box diagonals at or below this are degenerate.
pub const MIN_DIAGONAL: f64 = 1e-12;

/// Output of [`voxelize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Voxelization {
    /// Occupied voxels of the cloud.
    pub grid: VoxelGrid,
    /// Edge length of each voxel.
    pub voxel_size: f64,
}

/// `||bbox.extent|| / divisor` for the cloud.
///
/// Fails with [`PipelineError::DegenerateExtent`] when the cloud has fewer
/// than two distinct points or its diagonal is at most [`MIN_DIAGONAL`].
pub fn adaptive_voxel_size(cloud: &PointCloud, divisor: f64) -> Result<f64> {
    if !(divisor.is_finite() && divisor > 0.0) {
        return Err(PipelineError::InvalidConfig(format!(
            "voxel resolution divisor must be positive, got {divisor}"
        )));
    }
    let diagonal = cloud.bounding_box().map_or(0.0, |b| b.diagonal());
    if cloud.distinct_points_up_to(2) < 2 || diagonal <= MIN_DIAGONAL {
        return Err(PipelineError::DegenerateExtent { diagonal });
    }
    Ok(diagonal / divisor)
}

/// Builds a voxel grid whose cell size scales with the cloud.
pub fn voxelize<E>(engine: &E, cloud: &PointCloud, divisor: f64) -> Result<Voxelization>
where
    E: GeometryEngine + ?Sized,
{
    let voxel_size = adaptive_voxel_size(cloud, divisor)?;
    let grid = engine.voxelize(cloud, voxel_size)?;
    log::info!(
        "voxelized {} points into {} voxels (size {voxel_size:.6})",
        cloud.len(),
        grid.len()
    );
    Ok(Voxelization { grid, voxel_size })
}

#[cfg(test)]
mod tests {
    use glam::DVec3;
    use proptest::prelude::*;

    use super::*;
    use crate::test_support::FakeEngine;

    #[test]
    fn test_size_is_diagonal_over_divisor() {
        let cloud = PointCloud::new(vec![DVec3::ZERO, DVec3::new(3.0, 4.0, 12.0)]);
        let engine = FakeEngine::default();
        let result = voxelize(&engine, &cloud, 50.0).unwrap();
        assert_eq!(result.voxel_size, 13.0 / 50.0);
        assert_eq!(result.grid.voxel_size(), result.voxel_size);
        assert_eq!(engine.calls(), ["voxelize"]);
    }

    #[test]
    fn test_single_distinct_point_is_degenerate() {
        let cloud = PointCloud::new(vec![DVec3::ONE; 10]);
        assert!(matches!(
            adaptive_voxel_size(&cloud, 50.0),
            Err(PipelineError::DegenerateExtent { diagonal }) if diagonal == 0.0
        ));
    }

    #[test]
    fn test_empty_cloud_is_degenerate() {
        assert!(matches!(
            adaptive_voxel_size(&PointCloud::default(), 50.0),
            Err(PipelineError::DegenerateExtent { .. })
        ));
    }

    #[test]
    fn test_tiny_extent_is_degenerate() {
        let cloud = PointCloud::new(vec![DVec3::ZERO, DVec3::splat(1e-14)]);
        assert!(adaptive_voxel_size(&cloud, 50.0).is_err());
    }

    #[test]
    fn test_engine_not_called_on_degenerate_input() {
        let engine = FakeEngine::default();
        let cloud = PointCloud::new(vec![DVec3::ZERO]);
        assert!(voxelize(&engine, &cloud, 50.0).is_err());
        assert!(engine.calls().is_empty());
    }

    proptest! {
        #[test]
        fn prop_voxel_size_is_exact(
            coords in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0, -100.0f64..100.0), 2..50),
        ) {
            let points: Vec<DVec3> = coords.iter().map(|&(x, y, z)| DVec3::new(x, y, z)).collect();
            let cloud = PointCloud::new(points);
            let diagonal = cloud.bounding_box().unwrap().diagonal();
            prop_assume!(diagonal > 1e-6);
            prop_assert_eq!(adaptive_voxel_size(&cloud, 50.0).unwrap(), diagonal / 50.0);
        }
    }
}
