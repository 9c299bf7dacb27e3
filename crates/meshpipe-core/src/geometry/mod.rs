//! Geometry descriptors.
//!
//! A [`GeometryDescriptor`] is the value handed from one stage to the next:
//! - [`PointCloud`]: points with optional per-point colors and normals
//! - [`TriangleMesh`]: vertices plus index triples
//! - [`VoxelGrid`]: sparse occupied cells of a fixed size
//! - [`LineSet`]: points plus index pairs, used for markers
//!
//! Attribute arrays are all-or-nothing and always index-aligned with the
//! element array they annotate.

mod cleanup;
mod line_set;
mod point_cloud;
mod triangle_mesh;
mod voxel_grid;

pub use cleanup::{DEGENERATE_AREA_EPSILON, DUPLICATE_VERTEX_EPSILON};
pub use line_set::LineSet;
pub use point_cloud::PointCloud;
pub use triangle_mesh::TriangleMesh;
pub use voxel_grid::{Voxel, VoxelGrid};

use crate::bounds::Aabb;
use crate::summary::GeometrySummary;

/// Behaviour shared by every descriptor variant.
pub trait Geometry {
    /// Returns the type name of this geometry (e.g. "`PointCloud`").
    fn type_name(&self) -> &'static str;

    /// Returns the axis-aligned bounding box, or `None` when empty.
    fn bounding_box(&self) -> Option<Aabb>;

    /// Returns whether the geometry holds no elements.
    fn is_empty(&self) -> bool;

    /// Returns the element counts and attribute flags of this geometry.
    fn summary(&self) -> GeometrySummary;
}

/// Any geometry produced by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryDescriptor {
    /// A point cloud.
    PointCloud(PointCloud),
    /// A triangle mesh.
    TriangleMesh(TriangleMesh),
    /// A voxel grid.
    VoxelGrid(VoxelGrid),
    /// A line set.
    LineSet(LineSet),
}

impl GeometryDescriptor {
    fn inner(&self) -> &dyn Geometry {
        match self {
            Self::PointCloud(g) => g,
            Self::TriangleMesh(g) => g,
            Self::VoxelGrid(g) => g,
            Self::LineSet(g) => g,
        }
    }
}

impl Geometry for GeometryDescriptor {
    fn type_name(&self) -> &'static str {
        self.inner().type_name()
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.inner().bounding_box()
    }

    fn is_empty(&self) -> bool {
        self.inner().is_empty()
    }

    fn summary(&self) -> GeometrySummary {
        self.inner().summary()
    }
}

impl From<PointCloud> for GeometryDescriptor {
    fn from(value: PointCloud) -> Self {
        Self::PointCloud(value)
    }
}

impl From<TriangleMesh> for GeometryDescriptor {
    fn from(value: TriangleMesh) -> Self {
        Self::TriangleMesh(value)
    }
}

impl From<VoxelGrid> for GeometryDescriptor {
    fn from(value: VoxelGrid) -> Self {
        Self::VoxelGrid(value)
    }
}

impl From<LineSet> for GeometryDescriptor {
    fn from(value: LineSet) -> Self {
        Self::LineSet(value)
    }
}
