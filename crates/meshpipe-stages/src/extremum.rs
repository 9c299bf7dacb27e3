//! Extremum detection with wireframe markers.

use glam::DVec3;
use meshpipe_core::{Axis, Geometry, LineSet, PipelineError, PointCloud, Result, TriangleMesh};

/// Marker color for the minimum.
pub const MIN_MARKER_COLOR: DVec3 = DVec3::new(0.0, 0.0, 1.0);

/// Marker color for the maximum.
pub const MAX_MARKER_COLOR: DVec3 = DVec3::new(1.0, 0.0, 0.0);

/// Indices of the lowest and highest points along `axis`.
///
/// Ties go to the lowest index for both. `None` for an empty slice.
pub fn extremum_indices(points: &[DVec3], axis: Axis) -> Option<(usize, usize)> {
    let first = axis.component(*points.first()?);
    let (mut min_index, mut max_index) = (0, 0);
    let (mut min, mut max) = (first, first);

    for (i, &p) in points.iter().enumerate().skip(1) {
        let v = axis.component(p);
        if v < min {
            min = v;
            min_index = i;
        }
        if v > max {
            max = v;
            max_index = i;
        }
    }
    Some((min_index, max_index))
}

/// Markers highlighting the extent of a cloud along one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtremaAnnotation {
    pub min_index: usize,
    pub max_index: usize,
    pub min_point: DVec3,
    pub max_point: DVec3,
    /// Side of both marker cubes.
    pub cube_size: f64,
    pub min_marker: LineSet,
    pub max_marker: LineSet,
    /// Axis triad at the origin, scaled to the markers.
    pub frame: LineSet,
}

fn wire_cube(center: DVec3, size: f64, color: DVec3) -> LineSet {
    let cube = TriangleMesh::create_centered_box(DVec3::splat(size), center);
    LineSet::from_triangle_mesh(&cube).painted(color)
}

/// Locates the extrema of `cloud` along `axis` and builds their markers.
///
/// The cube side is `marker_size_ratio` times the largest bounding-box
/// extent; the coordinate frame is `frame_size_ratio` times the cube side.
pub fn annotate_extrema(
    cloud: &PointCloud,
    axis: Axis,
    marker_size_ratio: f64,
    frame_size_ratio: f64,
) -> Result<ExtremaAnnotation> {
    let (min_index, max_index) =
        extremum_indices(cloud.points(), axis).ok_or(PipelineError::EmptyPointCloud)?;
    let bbox = cloud
        .bounding_box()
        .ok_or(PipelineError::EmptyPointCloud)?;

    let cube_size = bbox.max_extent() * marker_size_ratio;
    let min_point = cloud.points()[min_index];
    let max_point = cloud.points()[max_index];
    log::info!(
        "{axis} extremes: min {min_point} (#{min_index}), max {max_point} (#{max_index})"
    );

    Ok(ExtremaAnnotation {
        min_index,
        max_index,
        min_point,
        max_point,
        cube_size,
        min_marker: wire_cube(min_point, cube_size, MIN_MARKER_COLOR),
        max_marker: wire_cube(max_point, cube_size, MAX_MARKER_COLOR),
        frame: LineSet::coordinate_frame(cube_size * frame_size_ratio),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn column() -> PointCloud {
        PointCloud::new(vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(0.0, 0.0, 5.0),
            DVec3::new(0.0, 0.0, -3.0),
        ])
    }

    #[test]
    fn test_extremum_indices() {
        assert_eq!(extremum_indices(column().points(), Axis::Z), Some((2, 1)));
        assert_eq!(extremum_indices(&[], Axis::Z), None);
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let points = [DVec3::ONE, DVec3::ZERO, DVec3::ONE, DVec3::ZERO];
        assert_eq!(extremum_indices(&points, Axis::X), Some((1, 0)));
        let flat = [DVec3::ZERO; 4];
        assert_eq!(extremum_indices(&flat, Axis::Y), Some((0, 0)));
    }

    #[test]
    fn test_markers() {
        let annotation = annotate_extrema(&column(), Axis::Z, 0.2, 0.5).unwrap();
        assert_eq!(annotation.min_point, DVec3::new(0.0, 0.0, -3.0));
        assert_eq!(annotation.max_point, DVec3::new(0.0, 0.0, 5.0));
        assert!((annotation.cube_size - 1.6).abs() < 1e-12);

        let bbox = annotation.min_marker.bounding_box().unwrap();
        assert!(bbox.center().abs_diff_eq(annotation.min_point, 1e-12));
        assert!((bbox.max_extent() - annotation.cube_size).abs() < 1e-12);

        // 12 cube edges plus one diagonal per face.
        assert_eq!(annotation.max_marker.num_lines(), 18);
        assert!(annotation
            .min_marker
            .colors()
            .unwrap()
            .iter()
            .all(|&c| c == MIN_MARKER_COLOR));
        assert!(annotation
            .max_marker
            .colors()
            .unwrap()
            .iter()
            .all(|&c| c == MAX_MARKER_COLOR));
    }

    #[test]
    fn test_frame_scales_with_cube() {
        let annotation = annotate_extrema(&column(), Axis::Z, 0.2, 0.5).unwrap();
        let frame = annotation.frame.bounding_box().unwrap();
        assert_eq!(frame.min, DVec3::ZERO);
        assert!((frame.max.x - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_empty_cloud() {
        assert!(matches!(
            annotate_extrema(&PointCloud::default(), Axis::Z, 0.2, 0.5),
            Err(PipelineError::EmptyPointCloud)
        ));
    }

    proptest! {
        #[test]
        fn prop_indices_match_bounds(
            coords in prop::collection::vec((-10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0), 1..80),
        ) {
            let points: Vec<DVec3> = coords.iter().map(|&(x, y, z)| DVec3::new(x, y, z)).collect();
            let (lo, hi) = extremum_indices(&points, Axis::Y).unwrap();
            prop_assert!(points.iter().all(|p| p.y >= points[lo].y && p.y <= points[hi].y));
            prop_assert!(points[..lo].iter().all(|p| p.y > points[lo].y));
            prop_assert!(points[..hi].iter().all(|p| p.y < points[hi].y));
        }
    }
}
