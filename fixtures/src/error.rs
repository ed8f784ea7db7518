//! Error types for fixture generation

use std::path::PathBuf;

/// Errors raised while planning or writing fixtures
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// Validator count, round count or a derived parameter is out of range
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Fault/quorum arithmetic leaves a required quorum group empty or out of bounds
    #[error("Infeasible partition for N={validators} (F={faulty}, T={threshold}): {reason}")]
    InfeasiblePartition {
        /// Validator count
        validators: u32,
        /// Fault count F
        faulty: u32,
        /// Quorum threshold T
        threshold: u32,
        /// What went wrong
        reason: String,
    },

    /// An output file could not be created or written
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML overrides could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Plan serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FixtureError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FixtureError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for fixture operations
pub type FixtureResult<T> = Result<T, FixtureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_file() {
        let err = FixtureError::io(
            "out/config_3.yaml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("config_3.yaml"));
        assert!(message.contains("denied"));
    }

    #[test]
    fn test_infeasible_partition_message() {
        let err = FixtureError::InfeasiblePartition {
            validators: 1,
            faulty: 0,
            threshold: 0,
            reason: "first-round quorum is empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Infeasible partition for N=1 (F=0, T=0): first-round quorum is empty"
        );
    }
}
