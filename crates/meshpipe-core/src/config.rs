//! Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::engine::MAX_RECONSTRUCTION_DEPTH;
use crate::error::{PipelineError, Result};
use crate::half_space::{HalfSpace, KeepSide};

/// Parameters for one pipeline run.
///
/// Missing fields fall back to their defaults when deserializing, so a
/// configuration file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of points sampled from the input surface.
    pub sample_count: usize,

    /// Search radius for normal estimation.
    pub normal_radius: f64,

    /// Maximum neighbours considered for normal estimation.
    pub normal_max_nn: usize,

    /// Neighbours used when propagating normal orientation.
    pub orientation_k: usize,

    /// Reconstruction depth (grid resolution is `2^depth` cells per side).
    pub reconstruction_depth: u32,

    /// Target cell width; `0` lets the depth decide.
    ///
    /// The cell count also depends on the cloud's extent, so a width asking
    /// for more than [`MAX_GRID_CELLS_PER_SIDE`](crate::MAX_GRID_CELLS_PER_SIDE)
    /// cells per side is clamped by the engine rather than rejected here.
    pub reconstruction_width: f64,

    /// Ratio between the reconstruction cube and the cloud's bounding box.
    pub reconstruction_scale: f64,

    /// Whether iso-surface vertices are placed by linear interpolation.
    pub reconstruction_linear_fit: bool,

    /// Quantile of the density field below which vertices are dropped.
    pub density_quantile: f64,

    /// Divides the bounding-box diagonal to obtain the voxel size.
    pub voxel_resolution_divisor: f64,

    /// Axis normal to the clipping plane.
    pub clip_axis: Axis,

    /// Offset of the clipping plane along `clip_axis`.
    pub clip_threshold: f64,

    /// Side of the clipping plane that is kept.
    pub clip_keep: KeepSide,

    /// Margin added around the clip-plane marker on the in-plane axes.
    pub clip_plane_padding: f64,

    /// Thickness of the clip-plane marker along `clip_axis`.
    pub clip_plane_thickness: f64,

    /// Axis mapped to colors.
    pub color_axis: Axis,

    /// Axis searched for extrema.
    pub extremum_axis: Axis,

    /// Marker cube side as a fraction of the largest bounding-box extent.
    pub marker_size_ratio: f64,

    /// Coordinate-frame size as a fraction of the marker cube side.
    pub frame_size_ratio: f64,

    /// Side of the box substituted when the input mesh cannot be loaded.
    pub fallback_box_size: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_count: 15_000,
            normal_radius: 0.1,
            normal_max_nn: 30,
            orientation_k: 30,
            reconstruction_depth: 6,
            reconstruction_width: 0.0,
            reconstruction_scale: 1.1,
            reconstruction_linear_fit: false,
            density_quantile: 0.2,
            voxel_resolution_divisor: 50.0,
            clip_axis: Axis::X,
            clip_threshold: 0.0,
            clip_keep: KeepSide::AtOrBelow,
            clip_plane_padding: 0.2,
            clip_plane_thickness: 0.02,
            color_axis: Axis::Z,
            extremum_axis: Axis::Z,
            marker_size_ratio: 0.2,
            frame_size_ratio: 0.5,
            fallback_box_size: 1.0,
        }
    }
}

impl PipelineConfig {
    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::debug!("loaded pipeline configuration from {}", path.display());
        Ok(config)
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The clipping half-space described by the `clip_*` fields.
    pub fn clip_half_space(&self) -> HalfSpace {
        HalfSpace::new(self.clip_axis, self.clip_threshold, self.clip_keep)
    }

    /// Checks that every value is in range.
    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PipelineError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )))
            }
        }

        if self.sample_count == 0 {
            return Err(PipelineError::InvalidConfig(
                "sample_count must be at least 1".into(),
            ));
        }
        if self.normal_max_nn == 0 || self.orientation_k == 0 {
            return Err(PipelineError::InvalidConfig(
                "neighbour counts must be at least 1".into(),
            ));
        }
        if !(1..=MAX_RECONSTRUCTION_DEPTH).contains(&self.reconstruction_depth) {
            return Err(PipelineError::InvalidConfig(format!(
                "reconstruction_depth must be in 1..={MAX_RECONSTRUCTION_DEPTH}, got {}",
                self.reconstruction_depth
            )));
        }
        if !(0.0..=1.0).contains(&self.density_quantile) {
            return Err(PipelineError::InvalidConfig(format!(
                "density_quantile must be in [0, 1], got {}",
                self.density_quantile
            )));
        }
        if !self.reconstruction_width.is_finite() || self.reconstruction_width < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "reconstruction_width must be non-negative, got {}",
                self.reconstruction_width
            )));
        }
        if !self.clip_threshold.is_finite() || !self.clip_plane_padding.is_finite() {
            return Err(PipelineError::InvalidConfig(
                "clip values must be finite".into(),
            ));
        }
        positive("normal_radius", self.normal_radius)?;
        positive("reconstruction_scale", self.reconstruction_scale)?;
        positive("voxel_resolution_divisor", self.voxel_resolution_divisor)?;
        positive("clip_plane_thickness", self.clip_plane_thickness)?;
        positive("marker_size_ratio", self.marker_size_ratio)?;
        positive("frame_size_ratio", self.frame_size_ratio)?;
        positive("fallback_box_size", self.fallback_box_size)?;
        Ok(())
    }
}
