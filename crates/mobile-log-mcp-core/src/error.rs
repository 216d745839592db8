//! Error types for the Mobile Log MCP Server.

use thiserror::Error;

/// Main error type for mobile log capture operations.
///
/// Only `StartupFailure` ever aborts an in-flight operation; unknown sessions
/// are reported as informational text results, post-start process failures are
/// absorbed into session state, and device-lookup failures degrade to
/// default-device behavior.
#[derive(Debug, Error)]
pub enum Error {
    /// The capture process could not be started or died within the settle
    /// window. Carries a remediation hint for the caller.
    #[error("log capture failed to start: {0}")]
    StartupFailure(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_failure_display() {
        let err = Error::StartupFailure("adb not found on PATH".to_string());
        assert_eq!(
            err.to_string(),
            "log capture failed to start: adb not found on PATH"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::Config("capture.buffer_capacity must be > 0".to_string());
        assert!(err.to_string().starts_with("configuration error:"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_type() {
        let success: Result<i32> = Ok(42);
        assert!(success.is_ok());

        let failure: Result<i32> = Err(Error::StartupFailure("boom".to_string()));
        assert!(failure.is_err());
    }
}
