//! Error types for meshpipe.

use thiserror::Error;

/// Errors surfaced by a [`GeometryEngine`](crate::engine::GeometryEngine) call.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A delegated operation failed.
    #[error("{operation} failed: {reason}")]
    Failed {
        operation: &'static str,
        reason: String,
    },

    /// The mesh file extension is not understood by the loader.
    #[error("unsupported mesh format '{0}'")]
    UnsupportedFormat(String),

    /// The operation needs more points than it was given.
    #[error("{operation} requires at least {required} points, got {actual}")]
    InsufficientPoints {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    /// I/O error while reading input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Shorthand for [`EngineError::Failed`].
    pub fn failed(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Failed {
            operation,
            reason: reason.into(),
        }
    }
}

/// The main error type for pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input mesh could not be loaded. Handled by substituting a fallback mesh.
    #[error("failed to load mesh from '{path}': {reason}")]
    LoadFailure { path: String, reason: String },

    /// A mesh without triangles was handed to a stage that needs a surface.
    #[error("degenerate input: mesh has no triangles")]
    EmptyMesh,

    /// A point cloud without points was handed to a stage that needs one.
    #[error("degenerate input: point cloud is empty")]
    EmptyPointCloud,

    /// The bounding box of the input collapses to (nearly) a point.
    #[error("degenerate extent: bounding-box diagonal {diagonal} is too small")]
    DegenerateExtent { diagonal: f64 },

    /// Density filtering removed every vertex of the reconstructed mesh.
    #[error("reconstruction degenerate: no vertices left above density threshold {threshold}")]
    DegenerateReconstruction { threshold: f64 },

    /// A delegated engine call failed.
    #[error("external engine error: {0}")]
    ExternalEngine(#[from] EngineError),

    /// A per-element attribute array does not match its element count.
    #[error("attribute '{attribute}' length mismatch: expected {expected}, got {actual}")]
    AttributeLengthMismatch {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A face or line references a vertex that does not exist.
    #[error("index {index} out of bounds for {len} vertices")]
    IndexOutOfBounds { index: u32, len: usize },

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Returns whether this error aborts the current pipeline run.
    ///
    /// Only [`PipelineError::LoadFailure`] is recoverable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::LoadFailure { .. })
    }
}

/// A specialized Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// A specialized Result type for engine calls.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Checks that an attribute array has one entry per element.
///
/// Trips a debug assertion in debug builds and returns
/// [`PipelineError::AttributeLengthMismatch`] otherwise.
pub fn check_attribute_len(attribute: &'static str, expected: usize, actual: usize) -> Result<()> {
    debug_assert_eq!(
        expected, actual,
        "attribute '{attribute}' length mismatch: expected {expected}, got {actual}"
    );
    if expected == actual {
        Ok(())
    } else {
        Err(PipelineError::AttributeLengthMismatch {
            attribute,
            expected,
            actual,
        })
    }
}
