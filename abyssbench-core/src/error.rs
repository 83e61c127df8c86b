//! Harness Errors

use thiserror::Error;

/// Boxed error produced by a failing workload.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by the measurement entry points.
///
/// Workload panics are never caught by the harness and therefore never show
/// up here; they unwind straight through to the caller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HarnessError {
    /// A target was required but none was supplied or registered.
    #[error("Invalid benchmark target: {0}")]
    InvalidTarget(String),

    /// No operation with this exact name exists on the target type.
    #[error("Method {name} not found.")]
    OperationNotFound {
        /// Type name of the target that was searched
        target: &'static str,
        /// Name that was looked up
        name: String,
    },

    /// Measurement parameters are out of range.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The workload itself returned an error. Display and source are the
    /// workload's own; use `downcast` on the inner box to recover it.
    #[error(transparent)]
    Invocation(BoxError),
}

impl HarnessError {
    /// Wrap a workload error without altering it.
    pub fn invocation(err: impl Into<BoxError>) -> Self {
        HarnessError::Invocation(err.into())
    }
}

/// Result alias used throughout the harness.
pub type Result<T, E = HarnessError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("disk on fire")]
    struct DiskError;

    #[test]
    fn test_invocation_is_transparent() {
        let err = HarnessError::invocation(DiskError);
        assert_eq!(err.to_string(), "disk on fire");

        match err {
            HarnessError::Invocation(inner) => assert!(inner.downcast_ref::<DiskError>().is_some()),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_not_found_message() {
        let err = HarnessError::OperationNotFound {
            target: "Hashes",
            name: "Crc".to_string(),
        };
        assert_eq!(err.to_string(), "Method Crc not found.");
    }
}
