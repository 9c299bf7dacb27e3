//! A pure-Rust [`GeometryEngine`] for meshpipe.
//!
//! [`NativeEngine`] loads OBJ/PLY meshes, samples surfaces, estimates and
//! orients normals, reconstructs surfaces through a signed-distance grid and
//! marching cubes, and voxelizes point clouds. Mesh cleanup uses the default
//! [`TriangleMesh`] passes from `meshpipe-core`.
//!
//! # Example
//!
//! ```no_run
//! use meshpipe_core::GeometryEngine;
//! use meshpipe_engine::NativeEngine;
//!
//! let engine = NativeEngine::with_seed(42);
//! let mesh = engine.load_mesh("finn.obj".as_ref()).unwrap();
//! let cloud = engine.sample_points_uniformly(&mesh, 15_000).unwrap();
//! ```

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::cast_possible_truncation)]

pub mod io;
mod marching_cubes;
pub mod normals;
pub mod reconstruct;
pub mod sampling;
pub mod voxelize;

use std::path::Path;

use glam::DVec3;
use kiddo::ImmutableKdTree;
use meshpipe_core::{
    EngineResult, GeometryEngine, NormalSearch, PoissonParams, PointCloud,
    SurfaceReconstruction, TriangleMesh, VoxelGrid,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seed used by [`NativeEngine::new`].
pub const DEFAULT_SEED: u64 = 0x6d65_7368;

/// Geometry engine implemented on top of `glam`, `nalgebra` and `rand`.
///
/// Every sampling call starts from the same seed, so identical inputs give
/// identical clouds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeEngine {
    seed: u64,
}

impl NativeEngine {
    /// Creates an engine with [`DEFAULT_SEED`].
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Creates an engine with an explicit sampling seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Returns the sampling seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for NativeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryEngine for NativeEngine {
    fn load_mesh(&self, path: &Path) -> EngineResult<TriangleMesh> {
        io::load_mesh(path)
    }

    fn sample_points_uniformly(
        &self,
        mesh: &TriangleMesh,
        count: usize,
    ) -> EngineResult<PointCloud> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        sampling::sample_points_uniformly(mesh, count, &mut rng)
    }

    fn estimate_normals(
        &self,
        cloud: &PointCloud,
        search: &NormalSearch,
    ) -> EngineResult<PointCloud> {
        normals::estimate_normals(cloud, search)
    }

    fn orient_normals_consistent(&self, cloud: &PointCloud, k: usize) -> EngineResult<PointCloud> {
        normals::orient_normals_consistent(cloud, k)
    }

    fn reconstruct_surface(
        &self,
        cloud: &PointCloud,
        params: &PoissonParams,
    ) -> EngineResult<SurfaceReconstruction> {
        reconstruct::reconstruct_surface(cloud, params)
    }

    fn voxelize(&self, cloud: &PointCloud, voxel_size: f64) -> EngineResult<VoxelGrid> {
        voxelize::voxelize(cloud, voxel_size)
    }
}

/// Builds a static kd-tree whose items are indices into `points`.
///
/// `points` must not be empty.
pub(crate) fn build_kdtree(points: &[DVec3]) -> ImmutableKdTree<f64, 3> {
    let entries: Vec<[f64; 3]> = points.iter().map(DVec3::to_array).collect();
    ImmutableKdTree::new_from_slice(&entries)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use kiddo::SquaredEuclidean;
    use proptest::prelude::*;

    use super::*;

    fn squared_distances(points: &[DVec3], query: DVec3) -> Vec<f64> {
        let mut all: Vec<f64> = points.iter().map(|p| p.distance_squared(query)).collect();
        all.sort_by(f64::total_cmp);
        all
    }

    #[test]
    fn test_kdtree_on_coincident_points() {
        let points = vec![DVec3::ZERO; 50];
        let tree = build_kdtree(&points);
        let q = DVec3::X.to_array();
        assert_eq!(tree.nearest_n::<SquaredEuclidean>(&q, NonZeroUsize::new(10).unwrap()).len(), 10);
        assert_eq!(tree.within_unsorted::<SquaredEuclidean>(&q, 1.5).len(), 50);
        assert!(tree.nearest_one::<SquaredEuclidean>(&q).item < 50);
    }

    #[test]
    fn test_kdtree_radius_limits_neighbours() {
        let mut points = Vec::new();
        for x in 0..4 {
            for y in 0..4 {
                for z in 0..4 {
                    points.push(DVec3::new(f64::from(x), f64::from(y), f64::from(z)));
                }
            }
        }
        let tree = build_kdtree(&points);
        // The query sits on a grid point: itself plus six axis neighbours.
        let hits = tree.nearest_n_within::<SquaredEuclidean>(&DVec3::ONE.to_array(), 1.44, NonZeroUsize::new(30).unwrap(), true);
        assert_eq!(hits.len(), 7);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(points[hits[0].item as usize], DVec3::ONE);
    }

    proptest! {
        #[test]
        fn prop_kdtree_matches_brute_force(
            coords in prop::collection::vec((-10i32..10, -10i32..10, -10i32..10), 1..80),
            query in (-12.0f64..12.0, -12.0f64..12.0, -12.0f64..12.0),
            k in 1usize..10,
        ) {
            let points: Vec<DVec3> = coords
                .iter()
                .map(|&(x, y, z)| DVec3::new(f64::from(x), f64::from(y), f64::from(z)))
                .collect();
            let query = DVec3::new(query.0, query.1, query.2);
            let tree = build_kdtree(&points);
            let expected = squared_distances(&points, query);
            let q = query.to_array();

            let nearest = tree.nearest_one::<SquaredEuclidean>(&q);
            let hit = points[nearest.item as usize].distance_squared(query);
            prop_assert!((nearest.distance - expected[0]).abs() < 1e-9);
            prop_assert!((hit - expected[0]).abs() < 1e-9);

            let mut got: Vec<f64> = tree
                .nearest_n::<SquaredEuclidean>(&q, NonZeroUsize::new(k).unwrap())
                .iter()
                .map(|n| n.distance)
                .collect();
            got.sort_by(f64::total_cmp);
            prop_assert_eq!(got.len(), k.min(points.len()));
            for (g, e) in got.iter().zip(&expected) {
                prop_assert!((g - e).abs() < 1e-9);
            }

            let within = expected.iter().filter(|&&d| d <= 16.0).count();
            prop_assert_eq!(tree.within_unsorted::<SquaredEuclidean>(&q, 16.0).len(), within);
        }
    }

    #[test]
    fn test_box_round_trip_through_engine() {
        let engine = NativeEngine::with_seed(5);
        let mesh = TriangleMesh::create_centered_box(DVec3::ONE, DVec3::ZERO);
        let cloud = engine.sample_points_uniformly(&mesh, 3_000).unwrap();
        let cloud = engine
            .estimate_normals(
                &cloud,
                &NormalSearch {
                    radius: 0.1,
                    max_nn: 30,
                },
            )
            .unwrap();
        let cloud = engine.orient_normals_consistent(&cloud, 30).unwrap();
        let result = engine
            .reconstruct_surface(
                &cloud,
                &PoissonParams {
                    depth: 4,
                    ..PoissonParams::default()
                },
            )
            .unwrap();
        assert!(result.mesh.num_triangles() > 0);
        assert_eq!(result.densities.len(), result.mesh.num_vertices());

        let grid = engine.voxelize(&cloud, 0.1).unwrap();
        assert!(!grid.voxels().is_empty());
    }

    #[test]
    fn test_same_seed_same_samples() {
        let mesh = TriangleMesh::create_box(1.0, 1.0, 1.0);
        let a = NativeEngine::with_seed(1).sample_points_uniformly(&mesh, 10).unwrap();
        let b = NativeEngine::with_seed(1).sample_points_uniformly(&mesh, 10).unwrap();
        let c = NativeEngine::with_seed(2).sample_points_uniformly(&mesh, 10).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
