/// Error handling for the API server
///
/// A closed error-kind enumeration maps every failure a workflow operation
/// can produce to an HTTP response. Domain-rule violations (duplicate email,
/// unknown tier, wrong credentials, unconfirmed account) are distinct typed
/// variants, never opaque strings, and persistence failures are classified
/// instead of being passed through verbatim.
///
/// Credential failures always render the same message whether the email was
/// unknown or the password wrong.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body failed validation (422)
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<ValidationErrorDetail>),

    /// Email already belongs to another account (409)
    #[error("Email address is already in use")]
    DuplicateEmail,

    /// Requested membership tier does not exist (400)
    #[error("Unknown membership tier")]
    UnknownRole,

    /// Wrong email or wrong password, indistinguishable by design (401)
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Account exists but has not been activated yet (403)
    #[error("Account is not activated yet")]
    NotConfirmed,

    /// Missing or invalid authentication (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database cannot be reached (503)
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    /// Internal server error (500); details are logged, not exposed
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "duplicate_email", "invalid_credentials")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            err @ ApiError::DuplicateEmail => {
                (StatusCode::CONFLICT, "duplicate_email", err.to_string(), None)
            }
            err @ ApiError::UnknownRole => {
                (StatusCode::BAD_REQUEST, "unknown_role", err.to_string(), None)
            }
            err @ ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                err.to_string(),
                None,
            ),
            err @ ApiError::NotConfirmed => {
                (StatusCode::FORBIDDEN, "not_confirmed", err.to_string(), None)
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::PersistenceUnavailable(msg) => {
                tracing::error!("Persistence unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "persistence_unavailable",
                    "The service is temporarily unavailable".to_string(),
                    None,
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Classifies sqlx errors
///
/// The unique-constraint violation on the accounts email column is the sole
/// authoritative duplicate signal; pool and io failures become 503.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::DuplicateEmail;
                    }
                }
                ApiError::Internal(format!("Database error: {}", db_err))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ApiError::PersistenceUnavailable(err.to_string())
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Flattens validator errors into field/message pairs
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::Validation(errors)
    }
}

/// Hashing problems are never user-facing
impl From<memberclub_shared::auth::password::PasswordError> for ApiError {
    fn from(err: memberclub_shared::auth::password::PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Token problems reject the request as unauthenticated
impl From<memberclub_shared::auth::jwt::JwtError> for ApiError {
    fn from(err: memberclub_shared::auth::jwt::JwtError) -> Self {
        match err {
            memberclub_shared::auth::jwt::JwtError::Expired => {
                ApiError::Unauthorized("Token expired".to_string())
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

impl From<memberclub_shared::mail::MailError> for ApiError {
    fn from(err: memberclub_shared::mail::MailError) -> Self {
        ApiError::Internal(format!("Notification delivery failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ApiError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert_eq!(
            ApiError::DuplicateEmail.to_string(),
            "Email address is already in use"
        );
    }

    #[test]
    fn test_credential_failures_share_one_message() {
        // Unknown email and wrong password both map to this single variant,
        // so the two rejections are indistinguishable to the client.
        let unknown_email = ApiError::InvalidCredentials;
        let wrong_password = ApiError::InvalidCredentials;
        assert_eq!(unknown_email.to_string(), wrong_password.to_string());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_validation_errors_flattened() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(email(message = "Invalid email format"))]
            email: String,
        }

        let probe = Probe {
            email: "not-an-email".to_string(),
        };
        let err: ApiError = probe.validate().unwrap_err().into();

        match err {
            ApiError::Validation(details) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "email");
                assert_eq!(details[0].message, "Invalid email format");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
