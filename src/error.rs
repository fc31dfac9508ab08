/// Error taxonomy for Outfitter - IBM Cloud tooling installer
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure classes surfaced by installer and token operations
#[derive(Debug, Error)]
pub enum Error {
    /// User input that fails validation (unknown artifact, bad boolean
    /// token, malformed override URL)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required external binary is not on the search path
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// The host OS or CPU architecture has no published artifacts
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// The release index could not produce a usable version
    #[error("could not resolve version for {artifact}: {reason}")]
    VersionResolutionFailed { artifact: String, reason: String },

    /// Download or extraction failure
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// Non-success HTTP status from a remote service
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// HTTP 200 carrying a service-level error payload
    #[error("service error: {message}")]
    ApiError { message: String },

    /// HTTP 200 whose body does not match the documented shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A wrapped subprocess exited unsuccessfully
    #[error("command failed: {0}")]
    CommandFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Aggregate verdict from a multi-artifact run
    #[error("{failed} of {total} installations failed")]
    BatchFailed { failed: usize, total: usize },
}

impl Error {
    /// Process exit code: 2 for usage errors, 1 for everything else
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_exit_two() {
        let err = Error::InvalidArgument("expected true or false".to_string());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_operational_errors_exit_one() {
        assert_eq!(
            Error::MissingDependency("ibmcloud".to_string()).exit_code(),
            1
        );
        assert_eq!(
            Error::TransferFailed("connection reset".to_string()).exit_code(),
            1
        );
        assert_eq!(Error::BatchFailed { failed: 1, total: 3 }.exit_code(), 1);
    }

    #[test]
    fn test_http_error_display_includes_status_and_body() {
        let err = Error::HttpError {
            status: 404,
            body: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
    }

    #[test]
    fn test_batch_failed_display() {
        let err = Error::BatchFailed { failed: 2, total: 5 };
        assert_eq!(err.to_string(), "2 of 5 installations failed");
    }
}
