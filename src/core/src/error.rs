use thiserror::Error;

/// OCI MCP error types
#[derive(Error, Debug)]
pub enum OciError {
    /// Registry/repository/reference could not be turned into a request target
    #[error("Invalid reference '{reference}': {message}")]
    InvalidReference { reference: String, message: String },

    /// Registry rejected the credentials or the challenge exchange failed
    #[error("Authentication failed for {registry}: {message}")]
    AuthenticationFailed { registry: String, message: String },

    /// Non-2xx response, network unreachability or TLS failure
    #[error("Failed to fetch {reference}: {message}")]
    FetchFailed {
        reference: String,
        status: Option<u16>,
        message: String,
    },

    /// Response body is not a parseable manifest document
    #[error("Malformed manifest for {reference}: {message}")]
    MalformedManifest { reference: String, message: String },

    /// Opt-in strict schema validation rejected the document
    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl OciError {
    /// Stable category name, used by callers to build their own error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            OciError::InvalidReference { .. } => "reference",
            OciError::AuthenticationFailed { .. } => "authentication",
            OciError::FetchFailed { .. } => "fetch",
            OciError::MalformedManifest { .. } => "malformed_manifest",
            OciError::SchemaValidation(_) => "schema_validation",
            OciError::ConfigError(_) => "config",
            OciError::IoError(_) => "io",
            OciError::SerializationError(_) => "serialization",
            OciError::Other(_) => "other",
        }
    }

    /// HTTP status reported by the registry, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            OciError::FetchFailed { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for OciError {
    fn from(err: serde_json::Error) -> Self {
        OciError::SerializationError(err.to_string())
    }
}

/// Result type alias for OCI MCP operations
pub type Result<T> = std::result::Result<T, OciError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_reference_display() {
        let error = OciError::InvalidReference {
            reference: "ghcr.io/:tag".to_string(),
            message: "empty repository".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid reference 'ghcr.io/:tag': empty repository"
        );
        assert_eq!(error.kind(), "reference");
    }

    #[test]
    fn test_authentication_failed_display() {
        let error = OciError::AuthenticationFailed {
            registry: "ghcr.io".to_string(),
            message: "401 Unauthorized".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Authentication failed for ghcr.io: 401 Unauthorized"
        );
        assert_eq!(error.kind(), "authentication");
    }

    #[test]
    fn test_fetch_failed_display_and_status() {
        let error = OciError::FetchFailed {
            reference: "ghcr.io/org/app:v1".to_string(),
            status: Some(404),
            message: "manifest unknown".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to fetch ghcr.io/org/app:v1: manifest unknown"
        );
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.kind(), "fetch");
    }

    #[test]
    fn test_connection_failure_has_no_status() {
        let error = OciError::FetchFailed {
            reference: "localhost:5000/app:v1".to_string(),
            status: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_malformed_manifest_display() {
        let error = OciError::MalformedManifest {
            reference: "ghcr.io/org/app:v1".to_string(),
            message: "expected value at line 1 column 1".to_string(),
        };
        assert!(error.to_string().starts_with("Malformed manifest for ghcr.io/org/app:v1"));
        assert_eq!(error.kind(), "malformed_manifest");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: OciError = io_error.into();
        assert!(matches!(error, OciError::IoError(_)));
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let result: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ invalid");
        let error: OciError = result.unwrap_err().into();
        assert!(matches!(error, OciError::SerializationError(_)));
        assert_eq!(error.kind(), "serialization");
    }

    #[test]
    fn test_other_error_display() {
        let error = OciError::Other("Unknown error occurred".to_string());
        assert_eq!(error.to_string(), "Unknown error occurred");
    }
}
