//! Coordinate-based heat-map coloring.

use glam::DVec3;
use meshpipe_core::{Axis, PointCloud, Result};

/// Maps `t` in `[0, 1]` to a blue-green-red ramp.
///
/// `0` is blue, `0.5` is green plus half red and blue, `1` is red.
pub fn heat_map_color(t: f64) -> DVec3 {
    DVec3::new(t, 1.0 - (t - 0.5).abs() * 2.0, 1.0 - t)
}

/// The coordinate of each point along `axis`, rescaled to `[0, 1]`.
///
/// Every value is `0` when all points share the coordinate.
pub fn normalized_axis_values(points: &[DVec3], axis: Axis) -> Vec<f64> {
    let (min, max) = points
        .iter()
        .map(|&p| axis.component(p))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    points
        .iter()
        .map(|&p| {
            if range > 0.0 {
                (axis.component(p) - min) / range
            } else {
                0.0
            }
        })
        .collect()
}

/// Returns `cloud` with its colors replaced by a heat map along `axis`.
pub fn color_by_axis(cloud: &PointCloud, axis: Axis) -> Result<PointCloud> {
    let colors = normalized_axis_values(cloud.points(), axis)
        .into_iter()
        .map(heat_map_color)
        .collect();
    log::debug!("colored {} points along {axis}", cloud.len());
    cloud.clone().with_colors(colors)
}
