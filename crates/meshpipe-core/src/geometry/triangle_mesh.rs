//! Triangle mesh descriptor.

use glam::DVec3;

use super::Geometry;
use crate::bounds::Aabb;
use crate::error::{check_attribute_len, PipelineError, Result};
use crate::summary::GeometrySummary;

/// A mesh of triangles indexing into a shared vertex array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub(super) vertices: Vec<DVec3>,
    pub(super) triangles: Vec<[u32; 3]>,
    pub(super) vertex_colors: Option<Vec<DVec3>>,
    pub(super) vertex_normals: Option<Vec<DVec3>>,
}

impl TriangleMesh {
    /// Creates a mesh, checking that every index is in range.
    pub fn new(vertices: Vec<DVec3>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        let len = vertices.len();
        if let Some(&index) = triangles.iter().flatten().find(|&&i| i as usize >= len) {
            return Err(PipelineError::IndexOutOfBounds { index, len });
        }
        Ok(Self {
            vertices,
            triangles,
            vertex_colors: None,
            vertex_normals: None,
        })
    }

    /// Creates an axis-aligned box with its minimum corner at the origin.
    ///
    /// Triangles are wound counter-clockwise when seen from outside.
    pub fn create_box(width: f64, height: f64, depth: f64) -> Self {
        // Corner `i` sits at (bit0 * width, bit1 * height, bit2 * depth).
        let vertices = (0..8_u32)
            .map(|i| {
                DVec3::new(
                    f64::from(i & 1) * width,
                    f64::from((i >> 1) & 1) * height,
                    f64::from((i >> 2) & 1) * depth,
                )
            })
            .collect();
        let triangles = vec![
            [0, 4, 6],
            [0, 6, 2],
            [1, 3, 7],
            [1, 7, 5],
            [0, 1, 5],
            [0, 5, 4],
            [2, 6, 7],
            [2, 7, 3],
            [0, 2, 3],
            [0, 3, 1],
            [4, 5, 7],
            [4, 7, 6],
        ];
        Self {
            vertices,
            triangles,
            vertex_colors: None,
            vertex_normals: None,
        }
    }

    /// Creates a box of the given size centered on `center`.
    pub fn create_centered_box(size: DVec3, center: DVec3) -> Self {
        Self::create_box(size.x, size.y, size.z).translated(center - size * 0.5)
    }

    /// Returns the mesh with its vertex colors replaced.
    pub fn with_vertex_colors(mut self, colors: Vec<DVec3>) -> Result<Self> {
        check_attribute_len("vertex_colors", self.vertices.len(), colors.len())?;
        self.vertex_colors = Some(colors);
        Ok(self)
    }

    /// Returns the mesh with its vertex normals replaced.
    pub fn with_vertex_normals(mut self, normals: Vec<DVec3>) -> Result<Self> {
        check_attribute_len("vertex_normals", self.vertices.len(), normals.len())?;
        self.vertex_normals = Some(normals);
        Ok(self)
    }

    /// Returns the mesh moved by `offset`.
    #[must_use]
    pub fn translated(mut self, offset: DVec3) -> Self {
        for v in &mut self.vertices {
            *v += offset;
        }
        self
    }

    /// Returns the mesh with every vertex painted `color`.
    #[must_use]
    pub fn painted(mut self, color: DVec3) -> Self {
        self.vertex_colors = Some(vec![color; self.vertices.len()]);
        self
    }

    /// Returns the vertices.
    #[must_use]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns the triangles.
    #[must_use]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the per-vertex colors, if any.
    #[must_use]
    pub fn vertex_colors(&self) -> Option<&[DVec3]> {
        self.vertex_colors.as_deref()
    }

    /// Returns the per-vertex normals, if any.
    #[must_use]
    pub fn vertex_normals(&self) -> Option<&[DVec3]> {
        self.vertex_normals.as_deref()
    }

    /// Returns the number of vertices.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Returns the three corner positions of a triangle.
    #[must_use]
    pub fn triangle_corners(&self, triangle: [u32; 3]) -> [DVec3; 3] {
        triangle.map(|i| self.vertices[i as usize])
    }

    /// Returns the area of a triangle.
    #[must_use]
    pub fn triangle_area(&self, triangle: [u32; 3]) -> f64 {
        let [a, b, c] = self.triangle_corners(triangle);
        (b - a).cross(c - a).length() * 0.5
    }

    /// Returns the total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles.iter().map(|&t| self.triangle_area(t)).sum()
    }
}

impl Geometry for TriangleMesh {
    fn type_name(&self) -> &'static str {
        "TriangleMesh"
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn summary(&self) -> GeometrySummary {
        GeometrySummary {
            kind: self.type_name(),
            point_count: self.vertices.len(),
            triangle_count: Some(self.triangles.len()),
            has_colors: self.vertex_colors.is_some(),
            has_normals: self.vertex_normals.is_some(),
            ..GeometrySummary::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_is_closed_and_outward() {
        let mesh = TriangleMesh::create_box(1.0, 2.0, 3.0);
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_triangles(), 12);
        assert!((mesh.surface_area() - 22.0).abs() < 1e-12);

        let center = mesh.bounding_box().unwrap().center();
        for &tri in mesh.triangles() {
            let [a, b, c] = mesh.triangle_corners(tri);
            let normal = (b - a).cross(c - a);
            let outward = (a + b + c) / 3.0 - center;
            assert!(normal.dot(outward) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn test_centered_box() {
        let mesh = TriangleMesh::create_centered_box(DVec3::ONE, DVec3::ZERO);
        let bbox = mesh.bounding_box().unwrap();
        assert_eq!(bbox.min, DVec3::splat(-0.5));
        assert_eq!(bbox.max, DVec3::splat(0.5));
    }

    #[test]
    fn test_index_out_of_bounds() {
        let result = TriangleMesh::new(vec![DVec3::ZERO; 3], vec![[0, 1, 3]]);
        assert!(matches!(
            result,
            Err(PipelineError::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_painted() {
        let mesh = TriangleMesh::create_box(1.0, 1.0, 1.0).painted(DVec3::splat(0.6));
        assert_eq!(mesh.vertex_colors().unwrap().len(), 8);
        assert!(mesh.summary().has_colors);
    }
}
