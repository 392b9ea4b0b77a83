use thiserror::Error;

/// Fatal conditions that abort before or during an operation.
///
/// Every variant surfaces as exit code 1 with its message; external tool
/// failures are reported by the `cmd` layer with the tool's own exit code.
#[derive(Debug, Error)]
pub enum CryptbootError {
    #[error("cryptboot must be run as root")]
    PermissionDenied,

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    GuardViolation(String),
}
