//! Implicit surface reconstruction from oriented points.
//!
//! The signed distance to the tangent plane of the nearest sample is
//! evaluated on a cubic node grid around the cloud, and its zero level set is
//! extracted with marching cubes. Each output vertex is weighted by how many
//! samples support it.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use glam::DVec3;
use kiddo::SquaredEuclidean;
use meshpipe_core::{
    EngineError, EngineResult, Geometry, PoissonParams, PointCloud, SurfaceReconstruction,
    TriangleMesh, MAX_GRID_CELLS_PER_SIDE, MAX_RECONSTRUCTION_DEPTH,
};

use crate::build_kdtree;
use crate::marching_cubes::{extract_isosurface, EdgePlacement};

const OPERATION: &str = "reconstruct_surface";

/// Cells per side of the reconstruction grid for a cube of side `side`.
///
/// Never exceeds [`MAX_GRID_CELLS_PER_SIDE`].
pub fn grid_resolution(side: f64, params: &PoissonParams) -> u32 {
    if params.width > 0.0 {
        let wanted = (side / params.width).ceil();
        if wanted > f64::from(MAX_GRID_CELLS_PER_SIDE) {
            log::warn!(
                "width {} needs {wanted} cells per side, clamping to {MAX_GRID_CELLS_PER_SIDE}",
                params.width
            );
        }
        (wanted.min(f64::from(MAX_GRID_CELLS_PER_SIDE)) as u32).max(1)
    } else {
        1 << params.depth.min(MAX_RECONSTRUCTION_DEPTH)
    }
}

/// Reconstructs a surface and per-vertex densities from an oriented cloud.
pub fn reconstruct_surface(
    cloud: &PointCloud,
    params: &PoissonParams,
) -> EngineResult<SurfaceReconstruction> {
    let Some(normals) = cloud.normals() else {
        return Err(EngineError::failed(OPERATION, "point cloud has no normals"));
    };
    if cloud.len() < 3 {
        return Err(EngineError::InsufficientPoints {
            operation: OPERATION,
            required: 3,
            actual: cloud.len(),
        });
    }
    if !(1..=MAX_RECONSTRUCTION_DEPTH).contains(&params.depth)
        || !(params.width.is_finite() && params.width >= 0.0)
        || !(params.scale.is_finite() && params.scale > 0.0)
    {
        return Err(EngineError::failed(
            OPERATION,
            format!("invalid parameters {params:?}"),
        ));
    }

    let bbox = cloud
        .bounding_box()
        .ok_or_else(|| EngineError::failed(OPERATION, "point cloud is empty"))?;
    let side = bbox.max_extent() * params.scale;
    if !(side.is_finite() && side > 0.0) {
        return Err(EngineError::failed(OPERATION, "point cloud has zero extent"));
    }

    let cells = grid_resolution(side, params);
    let nodes = cells + 1;
    let spacing = side / f64::from(cells);
    let origin = bbox.center() - DVec3::splat(side * 0.5);

    let points = cloud.points();
    let tree = build_kdtree(points);
    let mut field = Vec::with_capacity((nodes as usize).pow(3));
    for z in 0..nodes {
        for y in 0..nodes {
            for x in 0..nodes {
                let p = origin + DVec3::new(f64::from(x), f64::from(y), f64::from(z)) * spacing;
                let hit = tree.nearest_one::<SquaredEuclidean>(&p.to_array());
                let index = hit.item as usize;
                field.push((p - points[index]).dot(normals[index]));
            }
        }
    }

    let placement = if params.linear_fit {
        EdgePlacement::Interpolated
    } else {
        EdgePlacement::Midpoint
    };
    let iso = extract_isosurface(&field, [nodes; 3], placement);

    let vertices: Vec<DVec3> = iso.vertices.iter().map(|&v| origin + v * spacing).collect();
    let support_squared = (2.0 * spacing).powi(2);
    let densities: Vec<f64> = vertices
        .iter()
        .map(|v| {
            tree.within_unsorted::<SquaredEuclidean>(&v.to_array(), support_squared)
                .len() as f64
        })
        .collect();

    log::debug!(
        "reconstructed {} vertices, {} triangles on a {cells}^3 grid (spacing {spacing:.6})",
        vertices.len(),
        iso.triangles.len()
    );

    let mesh = TriangleMesh::new(vertices, iso.triangles)
        .and_then(|mesh| mesh.with_vertex_normals(iso.normals))
        .map_err(|e| EngineError::failed(OPERATION, e.to_string()))?;
    Ok(SurfaceReconstruction { mesh, densities })
}
