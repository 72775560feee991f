//! Error types for the hexgrid crates.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Primary error type for grid generation, caching and binning.
#[derive(Debug, Error)]
pub enum GridError {
    // === Validation Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    Validation { param: String, message: String },

    #[error("Unsupported resolution {0}: expected 0-15")]
    InvalidResolution(u8),

    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    // === Computation Errors ===
    #[error("Grid generation failed: {0}")]
    Generation(String),

    #[error("Failed to bin fire '{fire_id}': {message}")]
    Binning { fire_id: String, message: String },

    // === Storage Errors ===
    #[error("Cache I/O error: {0}")]
    CacheIo(String),

    #[error("Record store error: {0}")]
    RecordStore(String),

    // === Infrastructure Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GridError {
    /// Create a Validation error.
    pub fn validation(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a Generation error.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Create a Binning error.
    pub fn binning(fire_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Binning {
            fire_id: fire_id.into(),
            message: message.into(),
        }
    }

    /// Create a CacheIo error.
    pub fn cache_io(msg: impl Into<String>) -> Self {
        Self::CacheIo(msg.into())
    }

    /// True for errors raised before any computation starts.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GridError::Validation { .. }
                | GridError::InvalidResolution(_)
                | GridError::InvalidBbox(_)
                | GridError::InvalidDateRange(_)
        )
    }

    /// Short machine-readable code, stable across message changes.
    pub fn error_code(&self) -> &'static str {
        match self {
            GridError::Validation { .. }
            | GridError::InvalidResolution(_)
            | GridError::InvalidBbox(_)
            | GridError::InvalidDateRange(_) => "ValidationError",
            GridError::Generation(_) => "GenerationError",
            GridError::Binning { .. } => "BinningError",
            GridError::CacheIo(_) => "CacheIOError",
            GridError::RecordStore(_) => "RecordStoreError",
            GridError::Internal(_) => "InternalError",
        }
    }

    /// HTTP status code a hosting service should answer with.
    pub fn http_status_code(&self) -> u16 {
        match self {
            GridError::Validation { .. }
            | GridError::InvalidResolution(_)
            | GridError::InvalidBbox(_)
            | GridError::InvalidDateRange(_) => 400,

            GridError::RecordStore(_) => 503,

            _ => 500,
        }
    }
}

impl From<std::io::Error> for GridError {
    fn from(err: std::io::Error) -> Self {
        GridError::CacheIo(err.to_string())
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::CacheIo(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_map_to_400() {
        let errors = [
            GridError::InvalidResolution(16),
            GridError::InvalidBbox("min > max".into()),
            GridError::InvalidDateRange("start after end".into()),
            GridError::validation("zoom", "not a number"),
        ];
        for err in errors {
            assert!(err.is_validation());
            assert_eq!(err.http_status_code(), 400);
            assert_eq!(err.error_code(), "ValidationError");
        }
    }

    #[test]
    fn test_runtime_errors_are_not_validation() {
        assert!(!GridError::generation("tiler failed").is_validation());
        assert_eq!(GridError::cache_io("disk full").error_code(), "CacheIOError");
        assert_eq!(GridError::binning("f1", "bad ring").http_status_code(), 500);
    }
}
