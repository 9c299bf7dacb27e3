//! Area-weighted surface sampling.

use glam::DVec3;
use meshpipe_core::{EngineError, EngineResult, PointCloud, TriangleMesh};
use rand::Rng;

/// Draws `count` points uniformly per unit area of the mesh surface.
///
/// A triangle is picked with probability proportional to its area, then a
/// point is drawn uniformly inside it. Vertex colors and normals, when the
/// mesh has them, are interpolated barycentrically.
pub fn sample_points_uniformly<R: Rng>(
    mesh: &TriangleMesh,
    count: usize,
    rng: &mut R,
) -> EngineResult<PointCloud> {
    const OPERATION: &str = "sample_points_uniformly";

    if mesh.num_triangles() == 0 {
        return Err(EngineError::failed(OPERATION, "mesh has no triangles"));
    }

    let cumulative: Vec<f64> = mesh
        .triangles()
        .iter()
        .scan(0.0, |total, &tri| {
            *total += mesh.triangle_area(tri);
            Some(*total)
        })
        .collect();
    let total_area = cumulative.last().copied().unwrap_or(0.0);
    if !(total_area.is_finite() && total_area > 0.0) {
        return Err(EngineError::failed(
            OPERATION,
            format!("mesh surface area is {total_area}"),
        ));
    }

    let colors = mesh.vertex_colors();
    let normals = mesh.vertex_normals();
    let mut points = Vec::with_capacity(count);
    let mut point_colors = colors.map(|_| Vec::with_capacity(count));
    let mut point_normals = normals.map(|_| Vec::with_capacity(count));

    for _ in 0..count {
        let target = rng.gen::<f64>() * total_area;
        let face = cumulative
            .partition_point(|&c| c <= target)
            .min(cumulative.len() - 1);
        let tri = mesh.triangles()[face];

        let r1 = rng.gen::<f64>().sqrt();
        let r2 = rng.gen::<f64>();
        let weights = [1.0 - r1, r1 * (1.0 - r2), r1 * r2];

        points.push(blend(mesh.vertices(), tri, weights));
        if let (Some(out), Some(colors)) = (&mut point_colors, colors) {
            out.push(blend(colors, tri, weights));
        }
        if let (Some(out), Some(normals)) = (&mut point_normals, normals) {
            out.push(blend(normals, tri, weights).normalize_or_zero());
        }
    }

    log::debug!(
        "sampled {count} points over {} triangles (area {total_area:.6})",
        mesh.num_triangles()
    );
    PointCloud::from_parts(points, point_colors, point_normals)
        .map_err(|e| EngineError::failed(OPERATION, e.to_string()))
}

fn blend(values: &[DVec3], tri: [u32; 3], weights: [f64; 3]) -> DVec3 {
    values[tri[0] as usize] * weights[0]
        + values[tri[1] as usize] * weights[1]
        + values[tri[2] as usize] * weights[2]
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_exact_count_on_surface() {
        let mesh = TriangleMesh::create_centered_box(DVec3::ONE, DVec3::ZERO);
        let mut rng = StdRng::seed_from_u64(7);
        let cloud = sample_points_uniformly(&mesh, 2_000, &mut rng).unwrap();
        assert_eq!(cloud.len(), 2_000);
        for p in cloud.points() {
            let on_face = p.abs().max_element();
            assert!((on_face - 0.5).abs() < 1e-9, "{p:?} is off the surface");
        }
    }

    #[test]
    fn test_area_weighting() {
        // A large and a tiny triangle, far apart.
        let mesh = TriangleMesh::new(
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(10.0, 0.0, 0.0),
                DVec3::new(0.0, 10.0, 0.0),
                DVec3::new(100.0, 0.0, 0.0),
                DVec3::new(100.1, 0.0, 0.0),
                DVec3::new(100.0, 0.1, 0.0),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let cloud = sample_points_uniformly(&mesh, 1_000, &mut rng).unwrap();
        let far = cloud.points().iter().filter(|p| p.x >= 100.0).count();
        assert!(far < 10, "{far} samples on the tiny triangle");
    }

    #[test]
    fn test_interpolates_colors() {
        let mesh = TriangleMesh::create_box(1.0, 1.0, 1.0).painted(DVec3::new(0.2, 0.4, 0.6));
        let mut rng = StdRng::seed_from_u64(3);
        let cloud = sample_points_uniformly(&mesh, 50, &mut rng).unwrap();
        for c in cloud.colors().unwrap() {
            assert!(c.abs_diff_eq(DVec3::new(0.2, 0.4, 0.6), 1e-12));
        }
        assert!(!cloud.has_normals());
    }

    #[test]
    fn test_seed_is_reproducible() {
        let mesh = TriangleMesh::create_box(1.0, 2.0, 3.0);
        let a = sample_points_uniformly(&mesh, 100, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = sample_points_uniformly(&mesh, 100, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_mesh() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(sample_points_uniformly(&TriangleMesh::default(), 10, &mut rng).is_err());
    }
}
