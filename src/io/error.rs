//! Error types and context management for volume analysis operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all analysis operations
#[derive(Debug)]
pub enum AnalysisError {
    /// Decoded volume is malformed or degenerate
    Shape {
        /// Dimensions of the offending array
        dims: Vec<usize>,
        /// Description of what's wrong with the shape
        reason: String,
    },

    /// Scale fraction lies outside (0, 100]
    Range {
        /// The rejected fraction (percent of the shortest axis)
        scale: f64,
    },

    /// Scale fraction produces a sub-volume with an edge shorter than one voxel
    DegenerateVolume {
        /// The requested fraction (percent of the shortest axis)
        scale: f64,
        /// Length of the shortest axis of the full volume
        shortest_axis: usize,
    },

    /// Failed to decode a slice image from the filesystem
    VolumeLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image decoding error
        source: image::ImageError,
    },

    /// Failed to decode a multi-page TIFF volume
    TiffDecode {
        /// Path to the TIFF file
        path: PathBuf,
        /// Underlying TIFF decoding error
        source: tiff::TiffError,
    },

    /// Failed to write a result table
    Export {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying CSV error
        source: csv::Error,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Numerical computation produced an invalid result
    Computation {
        /// Name of the computation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },
}

const UNKNOWN_PATH: &str = "<unknown>";

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape { dims, reason } => {
                write!(f, "Invalid volume shape {dims:?}: {reason}")
            }
            Self::Range { scale } => {
                write!(f, "Scale fraction {scale} is outside the range (0, 100]")
            }
            Self::DegenerateVolume {
                scale,
                shortest_axis,
            } => {
                write!(
                    f,
                    "Scale fraction {scale} of shortest axis {shortest_axis} yields a sub-volume edge shorter than one voxel"
                )
            }
            Self::VolumeLoad { path, source } => {
                write!(f, "Failed to load slice '{}': {source}", path.display())
            }
            Self::TiffDecode { path, source } => {
                write!(f, "Failed to decode TIFF '{}': {source}", path.display())
            }
            Self::Export { path, source } => {
                write!(f, "Failed to export table to '{}': {source}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::Computation { operation, reason } => {
                write!(f, "Computation error in {operation}: {reason}")
            }
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::VolumeLoad { source, .. } => Some(source),
            Self::TiffDecode { source, .. } => Some(source),
            Self::Export { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for analysis results
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Additional context to enrich error messages
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// File being read or written when the error occurred
    pub path: Option<PathBuf>,
    /// Scale fraction being processed
    pub scale: Option<f64>,
    /// Operation being performed
    pub operation: Option<&'static str>,
}

/// Enriches error messages with the file and scale being processed
pub trait WithContext<T> {
    /// Add error context to a Result
    ///
    /// # Errors
    ///
    /// Propagates the original error with additional context applied
    fn with_context(self, context: ErrorContext) -> Result<T>;

    /// Attach the path involved in a failed read or write
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path applied
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;

    /// Attach the scale fraction being processed
    ///
    /// # Errors
    ///
    /// Propagates the original error with the scale applied
    fn with_scale(self, scale: f64) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<AnalysisError>,
{
    fn with_context(self, context: ErrorContext) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            match &mut error {
                AnalysisError::VolumeLoad { path, .. }
                | AnalysisError::TiffDecode { path, .. }
                | AnalysisError::Export { path, .. } => {
                    replace_unknown_path(path, context.path.as_ref());
                }
                AnalysisError::FileSystem {
                    path, operation, ..
                } => {
                    replace_unknown_path(path, context.path.as_ref());
                    if let Some(op) = context.operation {
                        if *operation == "unknown" {
                            *operation = op;
                        }
                    }
                }
                AnalysisError::Shape { reason, .. } => {
                    if let Some(path) = &context.path {
                        let shown = path.display().to_string();
                        if !reason.contains(&shown) {
                            reason.push_str(&format!(" (in '{shown}')"));
                        }
                    }
                }
                AnalysisError::Computation { reason, .. } => {
                    if let Some(scale) = context.scale {
                        reason.push_str(&format!(" (scale {scale}%)"));
                    }
                }
                _ => {}
            }
            error
        })
    }

    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.with_context(ErrorContext {
            path: Some(path.into()),
            ..Default::default()
        })
    }

    fn with_scale(self, scale: f64) -> Result<T> {
        self.with_context(ErrorContext {
            scale: Some(scale),
            ..Default::default()
        })
    }
}

fn replace_unknown_path(path: &mut PathBuf, replacement: Option<&PathBuf>) {
    if let Some(replacement) = replacement {
        if path.as_os_str() == UNKNOWN_PATH {
            replacement.clone_into(path);
        }
    }
}

impl From<image::ImageError> for AnalysisError {
    fn from(err: image::ImageError) -> Self {
        Self::VolumeLoad {
            path: PathBuf::from(UNKNOWN_PATH),
            source: err,
        }
    }
}

impl From<tiff::TiffError> for AnalysisError {
    fn from(err: tiff::TiffError) -> Self {
        Self::TiffDecode {
            path: PathBuf::from(UNKNOWN_PATH),
            source: err,
        }
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        Self::Export {
            path: PathBuf::from(UNKNOWN_PATH),
            source: err,
        }
    }
}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from(UNKNOWN_PATH),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> AnalysisError {
    AnalysisError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> AnalysisError {
    AnalysisError::Computation {
        operation,
        reason: reason.to_string(),
    }
}

/// Create a shape error for the given dimensions
pub fn shape_error(dims: &[usize], reason: &impl ToString) -> AnalysisError {
    AnalysisError::Shape {
        dims: dims.to_vec(),
        reason: reason.to_string(),
    }
}
