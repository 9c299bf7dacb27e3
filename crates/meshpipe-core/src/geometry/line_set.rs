//! Line set descriptor used for wireframe markers.

use std::collections::BTreeSet;

use glam::DVec3;

use super::{Geometry, TriangleMesh};
use crate::bounds::Aabb;
use crate::error::{check_attribute_len, PipelineError, Result};
use crate::summary::GeometrySummary;

/// Points connected by straight segments, with optional per-line colors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineSet {
    points: Vec<DVec3>,
    lines: Vec<[u32; 2]>,
    colors: Option<Vec<DVec3>>,
}

impl LineSet {
    /// Creates a line set, checking that every index is in range.
    pub fn new(points: Vec<DVec3>, lines: Vec<[u32; 2]>) -> Result<Self> {
        let len = points.len();
        if let Some(&index) = lines.iter().flatten().find(|&&i| i as usize >= len) {
            return Err(PipelineError::IndexOutOfBounds { index, len });
        }
        Ok(Self {
            points,
            lines,
            colors: None,
        })
    }

    /// Builds the set of unique undirected triangle edges of a mesh.
    ///
    /// Edges are ordered by their sorted endpoint indices.
    pub fn from_triangle_mesh(mesh: &TriangleMesh) -> Self {
        let edges: BTreeSet<[u32; 2]> = mesh
            .triangles()
            .iter()
            .flat_map(|t| [[t[0], t[1]], [t[1], t[2]], [t[2], t[0]]])
            .map(|[a, b]| [a.min(b), a.max(b)])
            .collect();
        Self {
            points: mesh.vertices().to_vec(),
            lines: edges.into_iter().collect(),
            colors: None,
        }
    }

    /// Three axis segments of length `size` from the origin, colored red,
    /// green and blue for x, y and z.
    pub fn coordinate_frame(size: f64) -> Self {
        Self {
            points: vec![
                DVec3::ZERO,
                DVec3::X * size,
                DVec3::Y * size,
                DVec3::Z * size,
            ],
            lines: vec![[0, 1], [0, 2], [0, 3]],
            colors: Some(vec![DVec3::X, DVec3::Y, DVec3::Z]),
        }
    }

    /// Returns the set with its per-line colors replaced.
    pub fn with_colors(mut self, colors: Vec<DVec3>) -> Result<Self> {
        check_attribute_len("line_colors", self.lines.len(), colors.len())?;
        self.colors = Some(colors);
        Ok(self)
    }

    /// Returns the set with every line painted `color`.
    #[must_use]
    pub fn painted(mut self, color: DVec3) -> Self {
        self.colors = Some(vec![color; self.lines.len()]);
        self
    }

    /// Returns the points.
    #[must_use]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Returns the index pairs.
    #[must_use]
    pub fn lines(&self) -> &[[u32; 2]] {
        &self.lines
    }

    /// Returns the per-line colors, if any.
    #[must_use]
    pub fn colors(&self) -> Option<&[DVec3]> {
        self.colors.as_deref()
    }

    /// Returns the number of lines.
    #[must_use]
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }
}

impl Geometry for LineSet {
    fn type_name(&self) -> &'static str {
        "LineSet"
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.points)
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn summary(&self) -> GeometrySummary {
        GeometrySummary {
            kind: self.type_name(),
            point_count: self.points.len(),
            line_count: Some(self.lines.len()),
            has_colors: self.colors.is_some(),
            ..GeometrySummary::default()
        }
    }
}
