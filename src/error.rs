//! Error types for RabbitOp

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for RabbitOp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for gateway fetches, where the classified error is the payload
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Coarse classification applied to every fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Timeout, connection failure, DNS
    Network,
    /// 401 - the session must be re-established
    Authentication,
    /// 403 - not retryable
    Authorization,
    /// 502/503/504 - the RabbitMQ backend behind the gateway is down
    ClusterUnavailable,
    /// Any other 4xx/5xx, or a malformed response
    Api,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Authorization => "authorization",
            ErrorKind::ClusterUnavailable => "cluster_unavailable",
            ErrorKind::Api => "api_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API-related errors
///
/// Variants carry plain strings so the error can be cloned into observable
/// controller state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Authentication failed. Run `rabbitop init` to refresh your token.")]
    Unauthorized,

    #[error("Access denied. You don't have permission to access this resource.")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Cluster unavailable: {0}")]
    ClusterUnavailable(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Classify the error for the presentation layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Unauthorized => ErrorKind::Authentication,
            ApiError::Forbidden => ErrorKind::Authorization,
            ApiError::ClusterUnavailable(_) => ErrorKind::ClusterUnavailable,
            ApiError::NotFound(_)
            | ApiError::RateLimit(_)
            | ApiError::BadRequest(_)
            | ApiError::ServerError(_)
            | ApiError::InvalidResponse(_) => ErrorKind::Api,
        }
    }

    /// Whether a caller-level retry policy may retry this failure.
    ///
    /// Authentication and authorization failures are never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_)
            | ApiError::ClusterUnavailable(_)
            | ApiError::RateLimit(_)
            | ApiError::ServerError(_) => true,
            ApiError::Unauthorized
            | ApiError::Forbidden
            | ApiError::NotFound(_)
            | ApiError::BadRequest(_)
            | ApiError::InvalidResponse(_) => false,
        }
    }

    /// Short hint shown next to a failed foreground load.
    pub fn suggested_action(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Network => "Check your network connection and the gateway URL, then retry.",
            ErrorKind::Authentication => "Your session has expired. Run `rabbitop init` to sign in again.",
            ErrorKind::Authorization => "Ask an administrator for access to this cluster.",
            ErrorKind::ClusterUnavailable => {
                "The RabbitMQ cluster is not responding. Retry in a moment."
            }
            ErrorKind::Api => "The gateway rejected the request. Check the filters and retry.",
        }
    }

    /// Map an HTTP status and body to an error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound(body),
            429 => ApiError::RateLimit(Duration::from_secs(60)),
            400 | 422 => ApiError::BadRequest(body),
            502..=504 => ApiError::ClusterUnavailable(body),
            500..=599 => ApiError::ServerError(body),
            _ => ApiError::InvalidResponse(format!("Unexpected status code: {}", status)),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to gateway".to_string())
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `rabbitop init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("API token not configured. Run `rabbitop init` to set up your token.")]
    MissingToken,

    #[error("Cluster not configured. Pass `--cluster <ID>` or set `default_cluster`.")]
    MissingCluster,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_unauthorized_message() {
        let err = ApiError::Unauthorized;
        assert!(err.to_string().contains("rabbitop init"));
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(ApiError::from_status(401, String::new()).kind(), ErrorKind::Authentication);
        assert_eq!(ApiError::from_status(403, String::new()).kind(), ErrorKind::Authorization);
        assert_eq!(
            ApiError::from_status(502, "bad gateway".into()).kind(),
            ErrorKind::ClusterUnavailable
        );
        assert_eq!(
            ApiError::from_status(503, String::new()).kind(),
            ErrorKind::ClusterUnavailable
        );
        assert_eq!(ApiError::from_status(500, String::new()).kind(), ErrorKind::Api);
        assert_eq!(ApiError::from_status(404, String::new()).kind(), ErrorKind::Api);
        assert_eq!(ApiError::from_status(418, String::new()).kind(), ErrorKind::Api);
    }

    #[test]
    fn test_auth_errors_never_retryable() {
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::Forbidden.is_retryable());
        assert!(ApiError::Network("timeout".into()).is_retryable());
        assert!(ApiError::ClusterUnavailable("down".into()).is_retryable());
    }

    #[test]
    fn test_suggested_action_matches_kind() {
        assert!(ApiError::Unauthorized.suggested_action().contains("rabbitop init"));
        assert!(
            ApiError::ClusterUnavailable("x".into())
                .suggested_action()
                .contains("cluster")
        );
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ErrorKind::ClusterUnavailable.to_string(), "cluster_unavailable");
        assert_eq!(ErrorKind::Api.to_string(), "api_error");
    }

    #[test]
    fn test_api_error_rate_limit() {
        let err = ApiError::RateLimit(Duration::from_secs(30));
        let msg = err.to_string();
        assert!(msg.contains("Rate limit"));
        assert!(msg.contains("30"));
    }

    #[test]
    fn test_config_error_missing_cluster() {
        let err = ConfigError::MissingCluster;
        assert!(err.to_string().contains("--cluster"));
    }

    #[test]
    fn test_error_from_api_error() {
        let err: Error = ApiError::Forbidden.into();
        match err {
            Error::Api(ApiError::Forbidden) => (),
            _ => panic!("Expected Error::Api(ApiError::Forbidden)"),
        }
    }

    #[test]
    fn test_config_error_from_yaml_error() {
        let yaml_str = "invalid: [yaml: content";
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let config_err: ConfigError = yaml_err.into();

        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }
}
