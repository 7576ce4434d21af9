use std::fmt;

/// Result type for Talos operations
pub type Result<T> = std::result::Result<T, TalosError>;

/// Main error type for the Talos library
#[derive(Debug, Clone)]
pub enum TalosError {
    /// Invalid dimensions for operations
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),

    /// Numerical computation errors
    NumericalError(String),

    /// Empty buffer or container
    EmptyBuffer(String),

    /// Training error
    TrainingError(String),
}

impl fmt::Display for TalosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TalosError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            TalosError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            TalosError::IoError(msg) => write!(f, "IO error: {}", msg),
            TalosError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            TalosError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
            TalosError::EmptyBuffer(msg) => write!(f, "Empty buffer: {}", msg),
            TalosError::TrainingError(msg) => write!(f, "Training error: {}", msg),
        }
    }
}

impl std::error::Error for TalosError {}

impl From<std::io::Error> for TalosError {
    fn from(err: std::io::Error) -> Self {
        TalosError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for TalosError {
    fn from(err: bincode::Error) -> Self {
        TalosError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for TalosError {
    fn from(err: serde_json::Error) -> Self {
        TalosError::SerializationError(err.to_string())
    }
}

// Helper functions for common error patterns
impl TalosError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        TalosError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        TalosError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
