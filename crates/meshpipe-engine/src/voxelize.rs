//! Point cloud voxelization.

use std::collections::BTreeMap;

use glam::{DVec3, IVec3};
use meshpipe_core::{EngineError, EngineResult, Geometry, PointCloud, Voxel, VoxelGrid};

/// Builds the grid of cells of side `voxel_size` occupied by the cloud.
///
/// The grid origin is the cloud's minimum corner moved back by half a cell,
/// so the extreme points never sit on a cell boundary. A cell's color is the
/// mean color of its points (black when the cloud has no colors).
#[allow(clippy::cast_possible_truncation)]
pub fn voxelize(cloud: &PointCloud, voxel_size: f64) -> EngineResult<VoxelGrid> {
    if !(voxel_size.is_finite() && voxel_size > 0.0) {
        return Err(EngineError::failed(
            "voxelize",
            format!("voxel size must be positive, got {voxel_size}"),
        ));
    }
    let Some(bbox) = cloud.bounding_box() else {
        return Ok(VoxelGrid::new(DVec3::ZERO, voxel_size, Vec::new()));
    };

    let origin = bbox.min - DVec3::splat(voxel_size * 0.5);
    let mut cells: BTreeMap<[i32; 3], (DVec3, usize)> = BTreeMap::new();
    for (i, p) in cloud.points().iter().enumerate() {
        let index = ((*p - origin) / voxel_size).floor().as_ivec3();
        let color = cloud.colors().map_or(DVec3::ZERO, |c| c[i]);
        let cell = cells.entry(index.to_array()).or_insert((DVec3::ZERO, 0));
        cell.0 += color;
        cell.1 += 1;
    }

    let voxels: Vec<Voxel> = cells
        .into_iter()
        .map(|(index, (color_sum, count))| Voxel {
            grid_index: IVec3::from_array(index),
            color: color_sum / count as f64,
        })
        .collect();
    log::debug!(
        "voxelized {} points into {} cells of size {voxel_size:.6}",
        cloud.len(),
        voxels.len()
    );
    Ok(VoxelGrid::new(origin, voxel_size, voxels))
}
