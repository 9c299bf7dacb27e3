//! Axis-aligned bounding boxes.

use glam::DVec3;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Aabb {
    /// Creates a box from its corners.
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Computes the tightest box around `points`.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    /// Per-axis side lengths.
    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }

    /// Euclidean norm of the extent vector.
    pub fn diagonal(&self) -> f64 {
        self.extent().length()
    }

    /// Center point.
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Largest side length.
    pub fn max_extent(&self) -> f64 {
        self.extent().max_element()
    }

    /// Returns whether `point` lies inside or on the box.
    pub fn contains(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Returns the box scaled about its center.
    pub fn scaled(&self, factor: f64) -> Self {
        let center = self.center();
        let half = self.extent() * 0.5 * factor;
        Self {
            min: center - half,
            max: center + half,
        }
    }
}
