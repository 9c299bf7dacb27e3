//! Point cloud descriptor.

use glam::DVec3;

use super::Geometry;
use crate::bounds::Aabb;
use crate::error::{check_attribute_len, Result};
use crate::summary::GeometrySummary;

/// An index-ordered set of points with optional per-point colors and normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<DVec3>,
    colors: Option<Vec<DVec3>>,
    normals: Option<Vec<DVec3>>,
}

impl PointCloud {
    /// Creates a point cloud without attributes.
    pub fn new(points: Vec<DVec3>) -> Self {
        Self {
            points,
            colors: None,
            normals: None,
        }
    }

    /// Creates a point cloud from points and optional attributes.
    pub fn from_parts(
        points: Vec<DVec3>,
        colors: Option<Vec<DVec3>>,
        normals: Option<Vec<DVec3>>,
    ) -> Result<Self> {
        if let Some(colors) = &colors {
            check_attribute_len("colors", points.len(), colors.len())?;
        }
        if let Some(normals) = &normals {
            check_attribute_len("normals", points.len(), normals.len())?;
        }
        Ok(Self {
            points,
            colors,
            normals,
        })
    }

    /// Returns the cloud with its colors replaced.
    pub fn with_colors(mut self, colors: Vec<DVec3>) -> Result<Self> {
        check_attribute_len("colors", self.points.len(), colors.len())?;
        self.colors = Some(colors);
        Ok(self)
    }

    /// Returns the cloud with its normals replaced.
    pub fn with_normals(mut self, normals: Vec<DVec3>) -> Result<Self> {
        check_attribute_len("normals", self.points.len(), normals.len())?;
        self.normals = Some(normals);
        Ok(self)
    }

    /// Returns the cloud with every point painted `color`.
    #[must_use]
    pub fn painted(mut self, color: DVec3) -> Self {
        self.colors = Some(vec![color; self.points.len()]);
        self
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns the points.
    #[must_use]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Returns the per-point colors, if any.
    #[must_use]
    pub fn colors(&self) -> Option<&[DVec3]> {
        self.colors.as_deref()
    }

    /// Returns the per-point normals, if any.
    #[must_use]
    pub fn normals(&self) -> Option<&[DVec3]> {
        self.normals.as_deref()
    }

    /// Returns whether a color attribute is present.
    #[must_use]
    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Returns whether a normal attribute is present.
    #[must_use]
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Splits the cloud into its arrays.
    #[must_use]
    pub fn into_parts(self) -> (Vec<DVec3>, Option<Vec<DVec3>>, Option<Vec<DVec3>>) {
        (self.points, self.colors, self.normals)
    }

    /// Counts points that differ from every earlier point, stopping at `limit`.
    #[must_use]
    pub fn distinct_points_up_to(&self, limit: usize) -> usize {
        let mut distinct: Vec<DVec3> = Vec::with_capacity(limit);
        for p in &self.points {
            if distinct.len() >= limit {
                break;
            }
            if !distinct.contains(p) {
                distinct.push(*p);
            }
        }
        distinct.len()
    }
}

impl Geometry for PointCloud {
    fn type_name(&self) -> &'static str {
        "PointCloud"
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
            has_colors: self.has_colors(),
            has_normals: self.has_normals(),
            ..GeometrySummary::default()
        }
    }
}
