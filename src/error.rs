use thiserror::Error;

use crate::fetch::FetchError;

/// Errors surfaced by every public filesystem operation
#[derive(Debug, Error)]
pub enum GhfsError {
    /// Malformed URI or URL: wrong scheme, missing segments
    #[error("Invalid GitHub locator: {0}")]
    InvalidLocator(String),

    /// A filesystem is already registered under this key
    #[error("GitHub filesystem already open for: {0}")]
    AlreadyOpen(String),

    /// No filesystem is registered under this key
    #[error("GitHub filesystem not found for: {0}")]
    HandleNotFound(String),

    /// The remote answered 404 for this path
    #[error("No such file or directory: {0}")]
    PathNotFound(String),

    /// Any other transport failure, passed through unchanged
    #[error("Transport failure: {0}")]
    TransportFailure(#[source] FetchError),

    /// The remote document does not have the expected listing shape
    #[error("Malformed remote response: {0}")]
    MalformedRemoteResponse(String),

    /// A mutating operation was attempted
    #[error("GitHub filesystem is read-only: {0} is not supported")]
    ReadOnlyViolation(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl GhfsError {
    /// Convert a fetch failure for `path`, turning a 404 into `PathNotFound`
    pub fn from_fetch(err: FetchError, path: &str) -> Self {
        match err {
            FetchError::NotFound { .. } => GhfsError::PathNotFound(path.to_string()),
            other => GhfsError::TransportFailure(other),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GhfsError::PathNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, GhfsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_path_not_found() {
        let err = GhfsError::from_fetch(
            FetchError::NotFound {
                url: "https://api.github.com/repos/o/r/contents/x?ref=main".to_string(),
            },
            "/x",
        );
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No such file or directory: /x");
    }

    #[test]
    fn test_other_failures_pass_through() {
        let err = GhfsError::from_fetch(
            FetchError::Http {
                status: 500,
                url: "https://example.invalid".to_string(),
            },
            "/x",
        );
        match err {
            GhfsError::TransportFailure(FetchError::Http { status, .. }) => {
                assert_eq!(status, 500)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
