//! AWS error vocabulary
//!
//! EKS, IAM and Auto Scaling codes mapped onto the canonical kinds.

use crate::error::ErrorKind;
use crate::normalize::{ErrorDialect, ErrorTable, NativeError};

/// Native code table for the services the AWS adapter calls
pub const AWS_ERROR_TABLE: ErrorTable = &[
    // EKS
    ("InvalidParameterException", ErrorKind::InvalidRequest),
    ("InvalidRequestException", ErrorKind::InvalidRequest),
    ("ClientException", ErrorKind::InvalidRequest),
    ("UnsupportedAvailabilityZoneException", ErrorKind::InvalidRequest),
    ("ResourceInUseException", ErrorKind::ResourceInUse),
    ("ResourceNotFoundException", ErrorKind::ResourceNotFound),
    ("NotFoundException", ErrorKind::ResourceNotFound),
    ("ResourceLimitExceededException", ErrorKind::ResourceLimitExceeded),
    ("ServerException", ErrorKind::ServiceUnavailable),
    ("ServiceUnavailableException", ErrorKind::ServiceUnavailable),
    ("ThrottlingException", ErrorKind::ServiceUnavailable),
    // IAM
    ("NoSuchEntity", ErrorKind::RoleNotFound),
    ("NoSuchEntityException", ErrorKind::RoleNotFound),
    ("ServiceFailure", ErrorKind::ServiceUnavailable),
    ("ServiceFailureException", ErrorKind::ServiceUnavailable),
    // Auto Scaling
    ("ValidationError", ErrorKind::InvalidRequest),
    ("ScalingActivityInProgress", ErrorKind::ResourceInUse),
    ("ResourceInUse", ErrorKind::ResourceInUse),
    ("LimitExceeded", ErrorKind::ResourceLimitExceeded),
    ("ResourceContention", ErrorKind::ServiceUnavailable),
    ("Throttling", ErrorKind::ServiceUnavailable),
];

/// AWS error dialect
pub const AWS_DIALECT: ErrorDialect = ErrorDialect {
    platform: "aws",
    table: AWS_ERROR_TABLE,
    parse: parse_error,
};

/// Extract the native code from a failed AWS REST-JSON response
///
/// The code comes from the `x-amzn-ErrorType` header when present, otherwise
/// from the body's `__type` / `code` / `Code` member. Namespace prefixes
/// (`com.amazonaws.eks#`) and header suffixes (`:http://...`) are stripped.
pub fn parse_error(status: u16, error_type: Option<&str>, body: &str) -> NativeError {
    let json: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        json.as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    let raw_code = error_type
        .map(str::to_string)
        .or_else(|| field("__type"))
        .or_else(|| field("code"))
        .or_else(|| field("Code"))
        .unwrap_or_default();
    let code = clean_code(&raw_code);

    let message = field("message")
        .or_else(|| field("Message"))
        .unwrap_or_else(|| body.trim().to_string());

    NativeError::new(code, message).with_status(status)
}

fn clean_code(raw: &str) -> String {
    let without_suffix = raw.split(':').next().unwrap_or_default();
    let without_namespace = without_suffix.rsplit('#').next().unwrap_or_default();
    without_namespace.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CloudError;

    #[test]
    fn test_codes_are_unique() {
        for (i, (code, _)) in AWS_ERROR_TABLE.iter().enumerate() {
            assert!(
                !AWS_ERROR_TABLE[i + 1..].iter().any(|(other, _)| other == code),
                "duplicate code {code}"
            );
        }
    }

    #[test]
    fn test_table_covers_provider_reported_kinds() {
        // Timeout and Unknown are produced locally, never by a native code
        let kinds = [
            ErrorKind::InvalidRequest,
            ErrorKind::RoleNotFound,
            ErrorKind::ResourceInUse,
            ErrorKind::ResourceNotFound,
            ErrorKind::ResourceLimitExceeded,
            ErrorKind::ServiceUnavailable,
        ];
        for kind in kinds {
            assert!(
                AWS_ERROR_TABLE.iter().any(|(_, k)| *k == kind),
                "no native code maps to {kind:?}"
            );
        }
        assert!(!AWS_ERROR_TABLE.iter().any(|(_, k)| *k == ErrorKind::Timeout));
    }

    #[test]
    fn test_parse_from_header() {
        let native = parse_error(
            404,
            Some("ResourceNotFoundException:http://internal.amazon.com/coral/com.amazonaws.eks/"),
            r#"{"message":"No cluster found for name: demo."}"#,
        );
        assert_eq!(native.code, "ResourceNotFoundException");
        assert_eq!(native.message, "No cluster found for name: demo.");
        assert_eq!(native.status, Some(404));
    }

    #[test]
    fn test_parse_from_namespaced_body_type() {
        let native = parse_error(
            409,
            None,
            r#"{"__type":"com.amazonaws.eks#ResourceInUseException","message":"Cluster has nodegroups attached"}"#,
        );
        assert_eq!(native.code, "ResourceInUseException");
    }

    #[test]
    fn test_parse_non_json_body() {
        let native = parse_error(502, None, "Bad Gateway\n");
        assert_eq!(native.code, "");
        assert_eq!(native.message, "Bad Gateway");
    }

    #[test]
    fn test_dialect_normalizes_role_lookup() {
        let err = AWS_DIALECT.normalize_response(
            404,
            None,
            r#"{"Code":"NoSuchEntity","Message":"The role with name spider-role cannot be found."}"#,
        );
        assert_eq!(
            err,
            CloudError::RoleNotFound("The role with name spider-role cannot be found.".to_string())
        );
    }

    #[test]
    fn test_dialect_falls_back_to_status() {
        let err = AWS_DIALECT.normalize_response(503, None, "upstream unavailable");
        assert!(err.is_transient());
    }
}
