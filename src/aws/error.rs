//! Failure conditions reported by the cloud provider APIs.
//!
//! The engine only cares about a handful of distinguished conditions
//! (missing user, denied key lookup, organizations disabled). Everything else
//! is carried through as [`ProviderError::Service`] with the SDK error code
//! and message so it can be attributed in warnings.

use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The requested entity (user, key) does not exist in this account.
    #[error("{operation}: entity not found")]
    NotFound { operation: &'static str },

    /// The caller is not allowed to see the requested resource.
    #[error("{operation}: access denied")]
    AccessDenied { operation: &'static str },

    /// AWS Organizations is not enabled for the calling account.
    #[error("AWS Organizations is not enabled for this account")]
    OrganizationsNotInUse,

    /// A response was missing a field the engine depends on.
    #[error("{operation}: response is missing {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("{operation} failed{}: {message}", code_suffix(.code))]
    Service {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },
}

impl ProviderError {
    pub fn service(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Service {
            operation,
            code: None,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(" ({c})"))
        .unwrap_or_default()
}

/// Map an SDK error onto the conditions the engine distinguishes.
///
/// Classification is by error code rather than by operation-specific variant
/// since IAM, Organizations and STS all share the same code vocabulary.
pub fn classify<E, R>(operation: &'static str, err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    match code.as_deref() {
        Some("NoSuchEntity") => ProviderError::NotFound { operation },
        Some(c) if c.starts_with("AccessDenied") => ProviderError::AccessDenied { operation },
        Some("AWSOrganizationsNotInUseException") => ProviderError::OrganizationsNotInUse,
        _ => ProviderError::Service {
            operation,
            code,
            message: DisplayErrorContext(&err).to_string(),
        },
    }
}
