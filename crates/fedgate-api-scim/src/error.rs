//! SCIM-specific error types conforming to RFC 7644 Section 3.12

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fedgate_db::DirectoryError;

/// SCIM error types as defined in RFC 7644 Section 3.12
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScimErrorType {
    /// Uniqueness constraint violated (e.g., duplicate userName)
    Uniqueness,
    /// Request syntax is invalid
    InvalidSyntax,
    /// Attribute value is invalid
    InvalidValue,
}

impl std::fmt::Display for ScimErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScimErrorType::Uniqueness => "uniqueness",
            ScimErrorType::InvalidSyntax => "invalidSyntax",
            ScimErrorType::InvalidValue => "invalidValue",
        };
        write!(f, "{s}")
    }
}

/// SCIM error response as defined in RFC 7644
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimErrorResponse {
    /// Always ["urn:ietf:params:scim:api:messages:2.0:Error"]
    pub schemas: Vec<String>,
    /// Optional SCIM error type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scim_type: Option<String>,
    /// Human-readable error message
    pub detail: String,
    /// HTTP status code as string
    pub status: String,
}

impl ScimErrorResponse {
    /// Create a new SCIM error response
    pub fn new(
        status: StatusCode,
        detail: impl Into<String>,
        scim_type: Option<ScimErrorType>,
    ) -> Self {
        Self {
            schemas: vec!["urn:ietf:params:scim:api:messages:2.0:Error".to_string()],
            scim_type: scim_type.map(|t| t.to_string()),
            detail: detail.into(),
            status: status.as_u16().to_string(),
        }
    }
}

/// SCIM API errors
#[derive(Debug, Error)]
pub enum ScimError {
    /// No credentials presented, or the Authorization header is malformed.
    /// Answered with a Bearer challenge.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Credentials presented but the token does not match.
    #[error("Invalid authentication token")]
    InvalidToken,

    /// No shared secret configured; every protocol call fails closed.
    #[error("SCIM authentication not configured")]
    NotConfigured,

    /// Resource not found
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Uniqueness constraint violated
    #[error("A {resource_type} with {field} '{value}' already exists")]
    Conflict {
        resource_type: &'static str,
        field: &'static str,
        value: String,
    },

    /// Invalid request syntax
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Directory store failure
    #[error("Directory store failure")]
    Directory(#[from] DirectoryError),
}

impl ScimError {
    /// Get the HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScimError::AuthenticationRequired | ScimError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            ScimError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ScimError::NotFound(_) => StatusCode::NOT_FOUND,
            ScimError::Conflict { .. } => StatusCode::CONFLICT,
            ScimError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ScimError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the SCIM error type for this error
    #[must_use]
    pub fn scim_type(&self) -> Option<ScimErrorType> {
        match self {
            ScimError::Conflict { .. } => Some(ScimErrorType::Uniqueness),
            ScimError::BadRequest(_) => Some(ScimErrorType::InvalidSyntax),
            _ => None,
        }
    }

    /// Convert to SCIM error response.
    ///
    /// Store failures are reported with a generic detail; the source is
    /// logged where the error is raised, never echoed to the client.
    #[must_use]
    pub fn to_response(&self) -> ScimErrorResponse {
        let detail = match self {
            ScimError::Directory(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        ScimErrorResponse::new(self.status_code(), detail, self.scim_type())
    }
}

impl IntoResponse for ScimError {
    fn into_response(self) -> Response {
        if let ScimError::Directory(ref source) = self {
            tracing::error!(error = %source, "SCIM request failed on directory store");
        }

        let status = self.status_code();
        let mut response = (status, Json(self.to_response())).into_response();

        // Challenge only when no usable credentials were presented.
        if matches!(self, ScimError::AuthenticationRequired) {
            response
                .headers_mut()
                .insert("WWW-Authenticate", "Bearer".parse().unwrap());
        }

        response
            .headers_mut()
            .insert("Content-Type", "application/scim+json".parse().unwrap());

        response
    }
}

/// Result type alias for SCIM operations
pub type ScimResult<T> = Result<T, ScimError>;
