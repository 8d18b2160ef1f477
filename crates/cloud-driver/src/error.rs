//! Canonical provider errors
//!
//! Every adapter failure surfaces as a [`CloudError`], whatever the platform's
//! native error vocabulary. The orchestrator reasons about failures only
//! through [`ErrorKind`].

use cluster_model::ValidationError;
use thiserror::Error;

/// Closed set of canonical error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRequest,
    RoleNotFound,
    ResourceInUse,
    ResourceNotFound,
    ResourceLimitExceeded,
    ServiceUnavailable,
    Timeout,
    Unknown,
}

/// Errors that can occur when calling a cloud provider
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CloudError {
    /// Bad bounds or missing fields; raised before any network call
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Required execution role does not exist
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// Resource is busy or has dependents
    #[error("Resource in use: {0}")]
    ResourceInUse(String),

    /// Resource does not exist
    #[error("Not found: {0}")]
    ResourceNotFound(String),

    /// Provider quota reached
    #[error("Resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    /// Transient provider or transport failure; the caller may retry the operation
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A wait deadline elapsed before the resource settled
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Native code with no canonical mapping
    #[error("Provider error {code}: {message}")]
    Unknown { code: String, message: String },
}

impl CloudError {
    /// Build an error of the given kind
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::InvalidRequest => Self::InvalidRequest(message),
            ErrorKind::RoleNotFound => Self::RoleNotFound(message),
            ErrorKind::ResourceInUse => Self::ResourceInUse(message),
            ErrorKind::ResourceNotFound => Self::ResourceNotFound(message),
            ErrorKind::ResourceLimitExceeded => Self::ResourceLimitExceeded(message),
            ErrorKind::ServiceUnavailable => Self::ServiceUnavailable(message),
            ErrorKind::Timeout => Self::Timeout(message),
            ErrorKind::Unknown => Self::Unknown {
                code: "Unknown".to_string(),
                message,
            },
        }
    }

    /// A resource settled in a failed state instead of the requested one
    pub fn failed_state(resource: impl std::fmt::Display, status: impl std::fmt::Display) -> Self {
        Self::Unknown {
            code: "ResourceFailed".to_string(),
            message: format!("{resource} settled in status {status}"),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::RoleNotFound(_) => ErrorKind::RoleNotFound,
            Self::ResourceInUse(_) => ErrorKind::ResourceInUse,
            Self::ResourceNotFound(_) => ErrorKind::ResourceNotFound,
            Self::ResourceLimitExceeded(_) => ErrorKind::ResourceLimitExceeded,
            Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::ResourceNotFound
    }

    /// Transient failures are worth re-polling
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::ServiceUnavailable
    }
}

impl From<ValidationError> for CloudError {
    fn from(e: ValidationError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

impl From<reqwest::Error> for CloudError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            Self::ServiceUnavailable(e.to_string())
        } else if e.is_decode() {
            Self::Unknown {
                code: "DecodeError".to_string(),
                message: e.to_string(),
            }
        } else {
            Self::Unknown {
                code: "HttpError".to_string(),
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for CloudError {
    fn from(e: serde_json::Error) -> Self {
        Self::Unknown {
            code: "SerializationError".to_string(),
            message: e.to_string(),
        }
    }
}
