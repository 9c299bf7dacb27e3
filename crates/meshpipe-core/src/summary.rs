//! Human-readable geometry reports.

use std::fmt;

/// Element counts and attribute flags of one geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeometrySummary {
    /// Type name of the summarized geometry.
    pub kind: &'static str,
    /// Number of points or vertices.
    pub point_count: usize,
    /// Number of triangles (meshes only).
    pub triangle_count: Option<usize>,
    /// Number of occupied voxels (voxel grids only).
    pub voxel_count: Option<usize>,
    /// Number of line segments (line sets only).
    pub line_count: Option<usize>,
    /// Whether a color attribute is present.
    pub has_colors: bool,
    /// Whether a normal attribute is present.
    pub has_normals: bool,
}

impl fmt::Display for GeometrySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |flag: bool| if flag { "yes" } else { "no" };
        write!(f, "{}: {} points", self.kind, self.point_count)?;
        if let Some(triangles) = self.triangle_count {
            write!(f, ", {triangles} triangles")?;
        }
        if let Some(voxels) = self.voxel_count {
            write!(f, ", {voxels} voxels")?;
        }
        if let Some(lines) = self.line_count {
            write!(f, ", {lines} lines")?;
        }
        write!(
            f,
            ", colors: {}, normals: {}",
            yes_no(self.has_colors),
            yes_no(self.has_normals)
        )
    }
}
