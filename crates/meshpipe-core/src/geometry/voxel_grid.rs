//! Sparse voxel grid descriptor.

use glam::{DVec3, IVec3};

use super::Geometry;
use crate::bounds::Aabb;
use crate::summary::GeometrySummary;

/// One occupied cell of a [`VoxelGrid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voxel {
    /// Integer cell coordinates relative to the grid origin.
    pub grid_index: IVec3,
    /// Mean color of the points that fell into the cell.
    pub color: DVec3,
}

/// A sparse set of cubic cells of equal size.
///
/// Cell `(i, j, k)` spans `origin + [i, i+1) * voxel_size` on each axis.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    origin: DVec3,
    voxel_size: f64,
    voxels: Vec<Voxel>,
}

impl VoxelGrid {
    /// Creates a grid; voxels are sorted by grid index and deduplicated.
    pub fn new(origin: DVec3, voxel_size: f64, mut voxels: Vec<Voxel>) -> Self {
        voxels.sort_by_key(|v| v.grid_index.to_array());
        voxels.dedup_by_key(|v| v.grid_index);
        Self {
            origin,
            voxel_size,
            voxels,
        }
    }

    /// Returns the world position of the grid's `(0, 0, 0)` corner.
    #[must_use]
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// Returns the side length of every cell.
    #[must_use]
    pub fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    /// Returns the occupied cells, sorted by grid index.
    #[must_use]
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Returns the number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Returns the world-space center of a cell.
    #[must_use]
    pub fn voxel_center(&self, grid_index: IVec3) -> DVec3 {
        self.origin + (grid_index.as_dvec3() + DVec3::splat(0.5)) * self.voxel_size
    }

    /// Returns whether a cell is occupied.
    #[must_use]
    pub fn contains(&self, grid_index: IVec3) -> bool {
        self.voxels
            .binary_search_by_key(&grid_index.to_array(), |v| v.grid_index.to_array())
            .is_ok()
    }
}

impl Geometry for VoxelGrid {
    fn type_name(&self) -> &'static str {
        "VoxelGrid"
    }

    fn bounding_box(&self) -> Option<Aabb> {
        let (first, rest) = self.voxels.split_first()?;
        let (lo, hi) = rest.iter().fold((first.grid_index, first.grid_index), |(lo, hi), v| {
            (lo.min(v.grid_index), hi.max(v.grid_index))
        });
        Some(Aabb::new(
            self.origin + lo.as_dvec3() * self.voxel_size,
            self.origin + (hi + IVec3::ONE).as_dvec3() * self.voxel_size,
        ))
    }

    fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    fn summary(&self) -> GeometrySummary {
        GeometrySummary {
            kind: self.type_name(),
            voxel_count: Some(self.voxels.len()),
            has_colors: !self.voxels.is_empty(),
            ..GeometrySummary::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voxel(x: i32, y: i32, z: i32) -> Voxel {
        Voxel {
            grid_index: IVec3::new(x, y, z),
            color: DVec3::ZERO,
        }
    }

    #[test]
    fn test_sorted_and_deduplicated() {
        let grid = VoxelGrid::new(
            DVec3::ZERO,
            0.5,
            vec![voxel(1, 0, 0), voxel(0, 0, 0), voxel(1, 0, 0)],
        );
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.voxels()[0].grid_index, IVec3::ZERO);
        assert!(grid.contains(IVec3::new(1, 0, 0)));
        assert!(!grid.contains(IVec3::new(2, 0, 0)));
    }

    #[test]
    fn test_bounds_and_centers() {
        let grid = VoxelGrid::new(DVec3::splat(-1.0), 0.5, vec![voxel(0, 0, 0), voxel(3, 1, 0)]);
        let bbox = grid.bounding_box().unwrap();
        assert_eq!(bbox.min, DVec3::splat(-1.0));
        assert_eq!(bbox.max, DVec3::new(1.0, 0.0, -0.5));
        assert_eq!(grid.voxel_center(IVec3::ZERO), DVec3::splat(-0.75));
    }
}
