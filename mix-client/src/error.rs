//! Client error types

use serde::Deserialize;
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Structured error body returned by the row store / RPC surface
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostgrestError {
    /// Backend error code, e.g. "42501" (policy) or "PGRST116" (no rows)
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl PostgrestError {
    /// Whether this error signals a row-level access policy rejection
    pub fn is_policy_denied(&self) -> bool {
        self.code.as_deref() == Some("42501")
            || self.message.to_lowercase().contains("permission")
            || self.message.to_lowercase().contains("policy")
    }
}

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Structured backend error (row store / RPC)
    #[error("{}", .0.message)]
    Backend(PostgrestError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the backend rejected the call for permission reasons
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Forbidden(_) | Self::Unauthorized => true,
            Self::Backend(pg) => pg.is_policy_denied(),
            _ => false,
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized => AppError::not_authenticated(),
            ClientError::Forbidden(msg) => {
                AppError::with_message(ErrorCode::RowPolicyDenied, msg)
            }
            ClientError::NotFound(what) => AppError::not_found(what),
            ClientError::Backend(pg) if pg.is_policy_denied() => {
                AppError::with_message(ErrorCode::RowPolicyDenied, pg.message)
            }
            ClientError::Backend(pg) => AppError::backend(pg.message),
            ClientError::Http(e) => {
                AppError::with_message(ErrorCode::NetworkError, e.to_string())
            }
            other => AppError::backend(other.to_string()),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_detection() {
        let pg = PostgrestError {
            code: Some("42501".into()),
            message: "new row violates row-level security policy".into(),
            details: None,
            hint: None,
        };
        assert!(pg.is_policy_denied());
        assert!(ClientError::Backend(pg).is_permission_denied());

        let plain = PostgrestError {
            code: Some("23505".into()),
            message: "duplicate key value".into(),
            details: None,
            hint: None,
        };
        assert!(!ClientError::Backend(plain).is_permission_denied());
    }

    #[test]
    fn test_app_error_mapping() {
        let err: AppError = ClientError::Unauthorized.into();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);

        let pg = PostgrestError {
            code: Some("42501".into()),
            message: "permission denied for table pedidos".into(),
            details: None,
            hint: None,
        };
        let err: AppError = ClientError::Backend(pg).into();
        assert_eq!(err.code, ErrorCode::RowPolicyDenied);
    }
}
