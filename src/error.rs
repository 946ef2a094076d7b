//! Error handling.

use thiserror::Error;

/// Superobbing engine error type
///
/// This type encapsulates the various errors that may occur. Configuration
/// errors are fatal and surface before any grouping work begins; per-group
/// conditions (coverage gaps, empty filtered sets, degenerate weighting) are
/// recovered locally and never appear here.
#[derive(Debug, Error)]
pub enum ObReduceError {
    /// A reduction spec references a quality marker field that no observation
    /// of that type carries
    #[error("type {type_code}: quality field {field} not present in the observation schema")]
    UnknownQualityField { type_code: u16, field: String },

    /// Grid cell spacing must be positive
    #[error("grid cell spacing must be positive, got {spacing}")]
    NonPositiveSpacing { spacing: f64 },

    /// Nearest-neighbour coverage cutoff must be positive
    #[error("grid point cutoff distance must be positive, got {cutoff}")]
    NonPositiveCutoff { cutoff: f64 },

    /// External grid latitude and longitude meshes must have the same shape
    #[error("grid latitude mesh {lat_shape:?} and longitude mesh {lon_shape:?} differ in shape")]
    GridShapeMismatch {
        lat_shape: Vec<usize>,
        lon_shape: Vec<usize>,
    },

    /// An external grid must contain at least one point
    #[error("external grid contains no points")]
    EmptyGrid,

    /// Error validating a pass configuration (single error)
    #[error("pass configuration is not valid")]
    SpecValidationSingle(#[from] validator::ValidationError),

    /// Error validating a pass configuration (multiple errors)
    #[error("pass configuration is not valid")]
    SpecValidation(#[from] validator::ValidationErrors),

    /// Error reading or writing an observation CSV file
    #[error("failed to read or write observation records")]
    Csv(#[from] csv::Error),

    /// Error parsing a pass configuration file
    #[error("failed to parse pass configuration")]
    ConfigParse(#[from] serde_json::Error),

    /// Error accessing a file
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A required column is missing from an observation CSV header
    #[error("observation CSV is missing required column {column}")]
    MissingColumn { column: String },

    /// A CSV field could not be parsed as the expected type
    #[error("invalid value {value:?} in column {column}")]
    InvalidField { column: String, value: String },
}
