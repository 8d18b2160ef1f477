//! Error normalization
//!
//! Each platform declares an [`ErrorDialect`]: a static table from native
//! error codes to canonical [`ErrorKind`]s plus a parser that extracts the
//! native code from a failed HTTP response. Normalization logs the native
//! code once and returns the canonical [`CloudError`].

use crate::error::{CloudError, ErrorKind};
use std::fmt;
use tracing::warn;

/// Native code to canonical kind mapping
pub type ErrorTable = &'static [(&'static str, ErrorKind)];

/// Parses `(http status, error-type header, body)` into a native error
pub type ErrorParser = fn(u16, Option<&str>, &str) -> NativeError;

/// Error as reported by the provider, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    pub code: String,
    pub message: String,
    pub status: Option<u16>,
}

impl NativeError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// A platform's error vocabulary
#[derive(Clone, Copy)]
pub struct ErrorDialect {
    pub platform: &'static str,
    pub table: ErrorTable,
    pub parse: ErrorParser,
}

impl fmt::Debug for ErrorDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorDialect")
            .field("platform", &self.platform)
            .field("codes", &self.table.len())
            .finish_non_exhaustive()
    }
}

impl ErrorDialect {
    /// Canonical kind for a native code, if the table knows it
    pub fn lookup(&self, code: &str) -> Option<ErrorKind> {
        self.table
            .iter()
            .find(|(native, _)| *native == code)
            .map(|(_, kind)| *kind)
    }

    /// Map a native error to the canonical taxonomy, logging the native detail once
    pub fn normalize(&self, native: NativeError) -> CloudError {
        warn!(
            platform = self.platform,
            code = %native.code,
            status = ?native.status,
            message = %native.message,
            "Provider call failed"
        );

        let kind = self
            .lookup(&native.code)
            .or_else(|| native.status.and_then(kind_for_status));

        match kind {
            Some(ErrorKind::Unknown) | None => CloudError::Unknown {
                code: native.code,
                message: native.message,
            },
            Some(kind) => CloudError::from_kind(kind, native.message),
        }
    }

    /// Normalize a failed HTTP response
    pub fn normalize_response(&self, status: u16, error_type: Option<&str>, body: &str) -> CloudError {
        self.normalize((self.parse)(status, error_type, body))
    }
}

/// Fallback when the body carries no recognizable code
fn kind_for_status(status: u16) -> Option<ErrorKind> {
    match status {
        400 | 422 => Some(ErrorKind::InvalidRequest),
        404 => Some(ErrorKind::ResourceNotFound),
        409 => Some(ErrorKind::ResourceInUse),
        429 | 500 | 502 | 503 | 504 => Some(ErrorKind::ServiceUnavailable),
        _ => None,
    }
}
