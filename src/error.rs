//! Error Module - Director Error Types
//!
//! Defines the error types used by the director service. The heuristics
//! themselves are total functions and never fail; errors are limited to
//! construction and lifecycle faults.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for director operations
#[derive(Debug, Error)]
pub enum DirectorError {
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Failed to spawn director thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    #[error("Director service already started")]
    AlreadyStarted,

    #[error("Director service not running")]
    NotRunning,
}

impl DirectorError {
    /// Check if this error indicates misuse of the service lifecycle
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            DirectorError::AlreadyStarted | DirectorError::NotRunning
        )
    }
}

/// Result type alias for director operations
pub type Result<T> = std::result::Result<T, DirectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DirectorError::NotRunning;
        assert_eq!(err.to_string(), "Director service not running");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: DirectorError =
            ConfigError::InvalidHeapSize("max_heap_size must be > 0".to_string()).into();
        assert!(err.to_string().contains("max_heap_size"));
        assert!(!err.is_lifecycle());
    }

    #[test]
    fn test_lifecycle_errors() {
        assert!(DirectorError::AlreadyStarted.is_lifecycle());
        assert!(DirectorError::NotRunning.is_lifecycle());
    }
}
