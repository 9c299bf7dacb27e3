//! Half-space clipping of point clouds.

use glam::DVec3;
use meshpipe_core::{Geometry, HalfSpace, PipelineError, PointCloud, Result, TriangleMesh};

/// Color of the clip-plane marker.
pub const CLIP_PLANE_COLOR: DVec3 = DVec3::new(0.6, 0.6, 0.6);

/// Keeps the points for which `predicate` holds.
///
/// The mask is evaluated and applied in one pass: a kept point carries its
/// color and normal along, so attributes stay index-aligned. No surviving
/// point yields an empty cloud.
pub fn clip_points<F>(cloud: &PointCloud, predicate: F) -> Result<PointCloud>
where
    F: Fn(DVec3) -> bool,
{
    let colors = cloud.colors();
    let normals = cloud.normals();
    let mut points = Vec::new();
    let mut kept_colors = colors.map(|_| Vec::new());
    let mut kept_normals = normals.map(|_| Vec::new());

    for (i, &p) in cloud.points().iter().enumerate() {
        if !predicate(p) {
            continue;
        }
        points.push(p);
        if let (Some(out), Some(colors)) = (&mut kept_colors, colors) {
            out.push(colors[i]);
        }
        if let (Some(out), Some(normals)) = (&mut kept_normals, normals) {
            out.push(normals[i]);
        }
    }

    PointCloud::from_parts(points, kept_colors, kept_normals)
}

/// Keeps the points inside `half_space`.
pub fn clip_half_space(cloud: &PointCloud, half_space: &HalfSpace) -> Result<PointCloud> {
    let clipped = clip_points(cloud, |p| half_space.contains(p))?;
    log::info!(
        "clipped {} -> {} points ({} {:?} {})",
        cloud.len(),
        clipped.len(),
        half_space.axis(),
        half_space.keep(),
        half_space.threshold()
    );
    Ok(clipped)
}

/// A thin gray slab showing where the cloud is clipped.
///
/// The slab is `thickness` thick along the clip axis and centered on the
/// threshold; on the other two axes it spans the cloud's range plus
/// `padding` on each side.
pub fn clip_plane_marker(
    cloud: &PointCloud,
    half_space: &HalfSpace,
    padding: f64,
    thickness: f64,
) -> Result<TriangleMesh> {
    let bbox = cloud
        .bounding_box()
        .ok_or(PipelineError::EmptyPointCloud)?;

    let axis = half_space.axis();
    let mut size = bbox.extent() + DVec3::splat(2.0 * padding);
    let mut center = bbox.center();
    size[axis.index()] = thickness;
    center[axis.index()] = half_space.threshold();

    Ok(TriangleMesh::create_centered_box(size, center).painted(CLIP_PLANE_COLOR))
}
