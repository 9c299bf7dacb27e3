//! Mesh file loading.
//!
//! OBJ goes through `tobj`, PLY through `ply-rs`. Polygons are triangulated
//! as fans; every model or element block is merged into one mesh.

use std::fs::File;
use std::path::Path;

use glam::DVec3;
use meshpipe_core::{EngineError, EngineResult, TriangleMesh};
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

const OPERATION: &str = "load_mesh";

/// Loads a triangle mesh, choosing the reader from the file extension.
pub fn load_mesh(path: &Path) -> EngineResult<TriangleMesh> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let mesh = match extension.as_str() {
        "obj" => load_obj(path)?,
        "ply" => load_ply(path)?,
        _ => return Err(EngineError::UnsupportedFormat(path.display().to_string())),
    };
    log::debug!(
        "loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.num_vertices(),
        mesh.num_triangles()
    );
    Ok(mesh)
}

fn load_obj(path: &Path) -> EngineResult<TriangleMesh> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| EngineError::failed(OPERATION, format!("{}: {e}", path.display())))?;

    let mut vertices = Vec::new();
    let mut colors = Vec::new();
    let mut triangles = Vec::new();
    let mut all_colored = true;

    for model in models {
        let mesh = model.mesh;
        let offset = vertices.len() as u32;

        vertices.extend(mesh.positions.chunks_exact(3).map(to_dvec3));
        if mesh.vertex_color.len() == mesh.positions.len() {
            colors.extend(mesh.vertex_color.chunks_exact(3).map(to_dvec3));
        } else {
            all_colored = false;
        }
        triangles.extend(
            mesh.indices
                .chunks_exact(3)
                .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
        );
    }

    let mesh = into_mesh(vertices, triangles)?;
    if all_colored && !colors.is_empty() {
        return mesh
            .with_vertex_colors(colors)
            .map_err(|e| EngineError::failed(OPERATION, e.to_string()));
    }
    Ok(mesh)
}

fn to_dvec3(c: &[f32]) -> DVec3 {
    DVec3::new(f64::from(c[0]), f64::from(c[1]), f64::from(c[2]))
}

fn load_ply(path: &Path) -> EngineResult<TriangleMesh> {
    let mut file = File::open(path)?;
    let ply = Parser::<DefaultElement>::new().read_ply(&mut file)?;

    let vertex_elements = ply
        .payload
        .get("vertex")
        .ok_or_else(|| EngineError::failed(OPERATION, "PLY file has no vertex element"))?;

    let mut vertices = Vec::with_capacity(vertex_elements.len());
    let mut colors = Vec::with_capacity(vertex_elements.len());
    for element in vertex_elements {
        let coordinate = |key: &str| {
            element.get(key).and_then(scalar).ok_or_else(|| {
                EngineError::failed(OPERATION, format!("vertex is missing property '{key}'"))
            })
        };
        vertices.push(DVec3::new(coordinate("x")?, coordinate("y")?, coordinate("z")?));

        let channel = |key: &str| element.get(key).map(color_channel);
        if let (Some(r), Some(g), Some(b)) = (channel("red"), channel("green"), channel("blue")) {
            colors.push(DVec3::new(r, g, b));
        }
    }

    let mut triangles = Vec::new();
    for face in ply.payload.get("face").into_iter().flatten() {
        let indices = face
            .get("vertex_indices")
            .or_else(|| face.get("vertex_index"))
            .and_then(index_list)
            .ok_or_else(|| EngineError::failed(OPERATION, "face is missing its index list"))?;
        for k in 1..indices.len().saturating_sub(1) {
            triangles.push([indices[0], indices[k], indices[k + 1]]);
        }
    }

    let mesh = into_mesh(vertices, triangles)?;
    if !colors.is_empty() && colors.len() == mesh.num_vertices() {
        return mesh
            .with_vertex_colors(colors)
            .map_err(|e| EngineError::failed(OPERATION, e.to_string()));
    }
    Ok(mesh)
}

fn into_mesh(vertices: Vec<DVec3>, triangles: Vec<[u32; 3]>) -> EngineResult<TriangleMesh> {
    TriangleMesh::new(vertices, triangles).map_err(|e| EngineError::failed(OPERATION, e.to_string()))
}

fn scalar(property: &Property) -> Option<f64> {
    match *property {
        Property::Char(v) => Some(f64::from(v)),
        Property::UChar(v) => Some(f64::from(v)),
        Property::Short(v) => Some(f64::from(v)),
        Property::UShort(v) => Some(f64::from(v)),
        Property::Int(v) => Some(f64::from(v)),
        Property::UInt(v) => Some(f64::from(v)),
        Property::Float(v) => Some(f64::from(v)),
        Property::Double(v) => Some(v),
        _ => None,
    }
}

/// Integer channels are 8-bit, float channels already in `[0, 1]`.
fn color_channel(property: &Property) -> f64 {
    match *property {
        Property::UChar(v) => f64::from(v) / 255.0,
        Property::Float(v) => f64::from(v),
        Property::Double(v) => v,
        ref other => scalar(other).unwrap_or(0.0) / 255.0,
    }
}

#[allow(clippy::cast_sign_loss)]
fn index_list(property: &Property) -> Option<Vec<u32>> {
    match property {
        Property::ListChar(v) => Some(v.iter().map(|&i| i as u32).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&i| u32::from(i)).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&i| i as u32).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&i| u32::from(i)).collect()),
        Property::ListInt(v) => Some(v.iter().map(|&i| i as u32).collect()),
        Property::ListUInt(v) => Some(v.clone()),
        _ => None,
    }
}
