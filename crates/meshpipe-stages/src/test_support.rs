//! Deterministic engine for stage tests.

use std::cell::RefCell;
use std::path::Path;

use glam::DVec3;
use meshpipe_core::{
    EngineError, EngineResult, GeometryEngine, NormalSearch, PoissonParams, PointCloud,
    SurfaceReconstruction, TriangleMesh, VoxelGrid,
};

/// Returns fixtures and records every call by name.
#[derive(Default)]
pub struct FakeEngine {
    /// Result of `load_mesh`; `None` fails the load.
    pub mesh: Option<TriangleMesh>,
    /// Result of `reconstruct_surface`.
    pub reconstruction: SurfaceReconstruction,
    /// Makes the sampler return one point fewer than requested.
    pub short_sample: bool,
    pub calls: RefCell<Vec<&'static str>>,
}

impl FakeEngine {
    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

impl GeometryEngine for FakeEngine {
    fn load_mesh(&self, path: &Path) -> EngineResult<TriangleMesh> {
        self.record("load_mesh");
        self.mesh
            .clone()
            .ok_or_else(|| EngineError::failed("load_mesh", format!("{} not found", path.display())))
    }

    fn sample_points_uniformly(
        &self,
        mesh: &TriangleMesh,
        count: usize,
    ) -> EngineResult<PointCloud> {
        self.record("sample_points_uniformly");
        let count = if self.short_sample { count - 1 } else { count };
        let points = mesh.vertices().iter().copied().cycle().take(count).collect();
        Ok(PointCloud::new(points))
    }

    fn estimate_normals(
        &self,
        cloud: &PointCloud,
        _search: &NormalSearch,
    ) -> EngineResult<PointCloud> {
        self.record("estimate_normals");
        cloud
            .clone()
            .with_normals(vec![-DVec3::Z; cloud.len()])
            .map_err(|e| EngineError::failed("estimate_normals", e.to_string()))
    }

    fn orient_normals_consistent(&self, cloud: &PointCloud, _k: usize) -> EngineResult<PointCloud> {
        self.record("orient_normals_consistent");
        cloud
            .clone()
            .with_normals(vec![DVec3::Z; cloud.len()])
            .map_err(|e| EngineError::failed("orient_normals_consistent", e.to_string()))
    }

    fn reconstruct_surface(
        &self,
        _cloud: &PointCloud,
        _params: &PoissonParams,
    ) -> EngineResult<SurfaceReconstruction> {
        self.record("reconstruct_surface");
        Ok(self.reconstruction.clone())
    }

    fn voxelize(&self, _cloud: &PointCloud, voxel_size: f64) -> EngineResult<VoxelGrid> {
        self.record("voxelize");
        Ok(VoxelGrid::new(DVec3::ZERO, voxel_size, Vec::new()))
    }

    fn remove_vertices_by_mask(
        &self,
        mesh: &mut TriangleMesh,
        mask: &[bool],
    ) -> meshpipe_core::Result<usize> {
        self.record("remove_vertices_by_mask");
        mesh.remove_vertices_by_mask(mask)
    }

    fn remove_degenerate_triangles(&self, mesh: &mut TriangleMesh) -> usize {
        self.record("remove_degenerate_triangles");
        mesh.remove_degenerate_triangles()
    }

    fn remove_duplicated_triangles(&self, mesh: &mut TriangleMesh) -> usize {
        self.record("remove_duplicated_triangles");
        mesh.remove_duplicated_triangles()
    }

    fn remove_duplicated_vertices(&self, mesh: &mut TriangleMesh) -> usize {
        self.record("remove_duplicated_vertices");
        mesh.remove_duplicated_vertices()
    }

    fn remove_non_manifold_edges(&self, mesh: &mut TriangleMesh) -> usize {
        self.record("remove_non_manifold_edges");
        mesh.remove_non_manifold_edges()
    }
}
