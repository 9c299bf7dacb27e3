//! Axis-aligned half-spaces used to clip point data.
//!
//! A half-space is bounded by the plane `axis == threshold`. Points on the
//! kept side survive a clip; the plane itself belongs to the
//! [`KeepSide::AtOrBelow`] side.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::axis::Axis;

/// Which side of the bounding plane is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeepSide {
    /// Keep points with `coordinate <= threshold`.
    #[default]
    AtOrBelow,
    /// Keep points with `coordinate > threshold`.
    Above,
}

/// A half-space bounded by an axis-aligned plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfSpace {
    axis: Axis,
    threshold: f64,
    keep: KeepSide,
}

impl HalfSpace {
    /// Creates a half-space keeping `axis <= threshold`.
    pub fn at_or_below(axis: Axis, threshold: f64) -> Self {
        Self::new(axis, threshold, KeepSide::AtOrBelow)
    }

    /// Creates a half-space keeping `axis > threshold`.
    pub fn above(axis: Axis, threshold: f64) -> Self {
        Self::new(axis, threshold, KeepSide::Above)
    }

    /// Creates a half-space with an explicit kept side.
    pub fn new(axis: Axis, threshold: f64, keep: KeepSide) -> Self {
        Self {
            axis,
            threshold,
            keep,
        }
    }

    /// Returns the axis normal to the bounding plane.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Returns the plane offset along the axis.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the kept side.
    pub fn keep(&self) -> KeepSide {
        self.keep
    }

    /// Signed distance from the plane, positive above it.
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        self.axis.component(point) - self.threshold
    }

    /// Returns whether a point is on the kept side.
    pub fn contains(&self, point: DVec3) -> bool {
        let value = self.axis.component(point);
        match self.keep {
            KeepSide::AtOrBelow => value <= self.threshold,
            KeepSide::Above => value > self.threshold,
        }
    }

    /// Projects a point onto the bounding plane.
    pub fn project(&self, point: DVec3) -> DVec3 {
        point - self.signed_distance(point) * self.axis.unit()
    }
}

impl Default for HalfSpace {
    fn default() -> Self {
        Self::at_or_below(Axis::X, 0.0)
    }
}
