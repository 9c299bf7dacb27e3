//! Normal estimation and orientation.
//!
//! Normals come from principal component analysis of each point's
//! neighbourhood: the eigenvector of the smallest covariance eigenvalue.
//! Orientation is propagated along a minimum spanning tree of the k-nearest
//! graph so that flips travel through flat regions first.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::num::NonZeroUsize;

use glam::DVec3;
use kiddo::SquaredEuclidean;
use meshpipe_core::{EngineError, EngineResult, NormalSearch, PointCloud};
use nalgebra::{Matrix3, SymmetricEigen, Vector3};

use crate::build_kdtree;

/// Estimates one normal per point from its hybrid radius/k neighbourhood.
///
/// Points with fewer than three neighbours get `+Z`. When the cloud already
/// carries normals, each fresh normal is flipped to agree with the old one.
pub fn estimate_normals(cloud: &PointCloud, search: &NormalSearch) -> EngineResult<PointCloud> {
    const OPERATION: &str = "estimate_normals";

    if cloud.len() < 3 {
        return Err(EngineError::InsufficientPoints {
            operation: OPERATION,
            required: 3,
            actual: cloud.len(),
        });
    }
    if search.max_nn == 0 || search.radius.is_nan() || search.radius <= 0.0 {
        return Err(EngineError::failed(
            OPERATION,
            format!(
                "invalid search (radius {}, max_nn {})",
                search.radius, search.max_nn
            ),
        ));
    }

    let points = cloud.points();
    let tree = build_kdtree(points);
    let radius_squared = search.radius * search.radius;
    let mut normals: Vec<DVec3> = points
        .iter()
        .map(|p| {
            let neighbors: Vec<DVec3> = tree
                .nearest_n_within::<SquaredEuclidean>(
                    &p.to_array(),
                    radius_squared,
                    NonZeroUsize::new(search.max_nn).expect("max_nn checked non-zero above"),
                    false,
                )
                .iter()
                .map(|n| points[n.item as usize])
                .collect();
            pca_normal(&neighbors)
        })
        .collect();

    if let Some(previous) = cloud.normals() {
        for (normal, old) in normals.iter_mut().zip(previous) {
            if normal.dot(*old) < 0.0 {
                *normal = -*normal;
            }
        }
    }

    log::debug!("estimated {} normals", normals.len());
    cloud
        .clone()
        .with_normals(normals)
        .map_err(|e| EngineError::failed(OPERATION, e.to_string()))
}

/// Smallest-variance direction of a neighbourhood, or `+Z` when undefined.
fn pca_normal(neighbors: &[DVec3]) -> DVec3 {
    if neighbors.len() < 3 {
        return DVec3::Z;
    }

    let centroid = neighbors.iter().copied().sum::<DVec3>() / neighbors.len() as f64;
    let mut covariance = Matrix3::<f64>::zeros();
    for p in neighbors {
        let d = *p - centroid;
        let d = Vector3::new(d.x, d.y, d.z);
        covariance += d * d.transpose();
    }

    let eigen = SymmetricEigen::new(covariance);
    let values = eigen.eigenvalues;
    let smallest = if values[0] <= values[1] && values[0] <= values[2] {
        0
    } else if values[1] <= values[2] {
        1
    } else {
        2
    };
    let column = eigen.eigenvectors.column(smallest);
    let normal = DVec3::new(column[0], column[1], column[2]);

    let length = normal.length();
    if length > 1e-10 {
        normal / length
    } else {
        DVec3::Z
    }
}

/// Candidate tree edge, ordered so that `BinaryHeap` pops the lightest.
#[derive(Debug, Clone, Copy)]
struct Edge {
    weight: f64,
    from: usize,
    to: usize,
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Edge {}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .total_cmp(&self.weight)
            .then(other.to.cmp(&self.to))
            .then(other.from.cmp(&self.from))
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Flips normals into a consistent orientation.
///
/// Builds the symmetric k-nearest graph weighted by `1 - |n_i . n_j|` and
/// grows a minimum spanning tree from the highest point of each connected
/// component. The root normal is turned to `+z`; every other normal is
/// flipped when it disagrees with its tree parent.
pub fn orient_normals_consistent(cloud: &PointCloud, k: usize) -> EngineResult<PointCloud> {
    const OPERATION: &str = "orient_normals_consistent";

    let Some(normals) = cloud.normals() else {
        return Err(EngineError::failed(OPERATION, "point cloud has no normals"));
    };
    if k == 0 {
        return Err(EngineError::failed(OPERATION, "k must be at least 1"));
    }

    let points = cloud.points();
    if points.is_empty() {
        return Ok(cloud.clone());
    }
    let mut normals = normals.to_vec();
    let tree = build_kdtree(points);

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
    for (i, p) in points.iter().enumerate() {
        for neighbor in tree.nearest_n::<SquaredEuclidean>(
            &p.to_array(),
            NonZeroUsize::new(k + 1).expect("k + 1 is non-zero"),
        ) {
            let j = neighbor.item as usize;
            if j != i {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }

    let mut visited = vec![false; points.len()];
    let mut components = 0;
    while let Some(root) = highest_unvisited(points, &visited) {
        components += 1;
        if normals[root].z < 0.0 {
            normals[root] = -normals[root];
        }
        visited[root] = true;

        let mut heap = BinaryHeap::new();
        push_edges(&mut heap, &adjacency, &normals, &visited, root);
        while let Some(edge) = heap.pop() {
            if visited[edge.to] {
                continue;
            }
            visited[edge.to] = true;
            if normals[edge.to].dot(normals[edge.from]) < 0.0 {
                normals[edge.to] = -normals[edge.to];
            }
            push_edges(&mut heap, &adjacency, &normals, &visited, edge.to);
        }
    }

    log::debug!(
        "oriented {} normals over {components} component(s)",
        normals.len()
    );
    cloud
        .clone()
        .with_normals(normals)
        .map_err(|e| EngineError::failed(OPERATION, e.to_string()))
}

fn push_edges(
    heap: &mut BinaryHeap<Edge>,
    adjacency: &[Vec<usize>],
    normals: &[DVec3],
    visited: &[bool],
    from: usize,
) {
    for &to in &adjacency[from] {
        if !visited[to] {
            heap.push(Edge {
                weight: 1.0 - normals[from].dot(normals[to]).abs(),
                from,
                to,
            });
        }
    }
}

/// Index of the unvisited point with the largest z, lowest index on ties.
fn highest_unvisited(points: &[DVec3], visited: &[bool]) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .filter(|&(i, _)| !visited[i])
        .fold(None, |best: Option<usize>, (i, p)| match best {
            Some(b) if points[b].z >= p.z => Some(b),
            _ => Some(i),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(n: usize) -> PointCloud {
        let mut points = Vec::new();
        for i in 0..n {
            for j in 0..n {
                points.push(DVec3::new(i as f64 * 0.1, j as f64 * 0.1, 0.0));
            }
        }
        PointCloud::new(points)
    }

    fn fibonacci_sphere(n: usize) -> PointCloud {
        let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
        let points = (0..n)
            .map(|i| {
                let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
                let r = (1.0 - y * y).sqrt();
                let theta = golden * i as f64;
                DVec3::new(r * theta.cos(), y, r * theta.sin())
            })
            .collect();
        PointCloud::new(points)
    }

    const SEARCH: NormalSearch = NormalSearch {
        radius: 0.5,
        max_nn: 15,
    };

    #[test]
    fn test_planar_normals() {
        let cloud = estimate_normals(&plane(10), &SEARCH).unwrap();
        for n in cloud.normals().unwrap() {
            assert!((n.z.abs() - 1.0).abs() < 1e-9, "normal {n:?}");
        }
    }

    #[test]
    fn test_existing_normals_guide_sign() {
        let cloud = plane(6).with_normals(vec![-DVec3::Z; 36]).unwrap();
        let cloud = estimate_normals(&cloud, &SEARCH).unwrap();
        assert!(cloud.normals().unwrap().iter().all(|n| n.z < -0.99));
    }

    #[test]
    fn test_isolated_points_default_to_z() {
        let cloud = PointCloud::new(vec![DVec3::ZERO, DVec3::X * 10.0, DVec3::Y * 10.0]);
        let cloud = estimate_normals(&cloud, &SEARCH).unwrap();
        assert_eq!(cloud.normals().unwrap(), &[DVec3::Z; 3]);
    }

    #[test]
    fn test_too_few_points() {
        let cloud = PointCloud::new(vec![DVec3::ZERO, DVec3::X]);
        assert!(matches!(
            estimate_normals(&cloud, &SEARCH),
            Err(EngineError::InsufficientPoints { required: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_orient_plane_up() {
        let mut flipped = Vec::new();
        for i in 0..64 {
            flipped.push(if i % 3 == 0 { -DVec3::Z } else { DVec3::Z });
        }
        let cloud = plane(8).with_normals(flipped).unwrap();
        let oriented = orient_normals_consistent(&cloud, 8).unwrap();
        assert!(oriented.normals().unwrap().iter().all(|n| *n == DVec3::Z));
    }

    #[test]
    fn test_orient_sphere_outward() {
        let cloud = fibonacci_sphere(400);
        let cloud = estimate_normals(&cloud, &SEARCH).unwrap();
        let oriented = orient_normals_consistent(&cloud, 10).unwrap();
        for (p, n) in oriented.points().iter().zip(oriented.normals().unwrap()) {
            assert!(p.dot(*n) > 0.0, "normal at {p:?} points inward");
        }
    }

    #[test]
    fn test_orient_requires_normals() {
        assert!(orient_normals_consistent(&plane(3), 4).is_err());
    }
}
