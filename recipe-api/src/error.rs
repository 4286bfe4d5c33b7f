/// Error handling for the API server
///
/// All handlers return `ApiResult<T>`; `ApiError` converts to an HTTP
/// response with a JSON body:
///
/// ```json
/// {
///   "error": "validation_error",
///   "message": "Request validation failed",
///   "details": [{ "field": "password", "message": "Ensure this field has at least 6 characters." }]
/// }
/// ```
///
/// Validation and uniqueness failures are client errors (400) carrying
/// per-field details. Error bodies never contain a `token` key.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use recipe_shared::{
    auth::{context::AuthError, password::PasswordError},
    models::{recipe::RecipeError, user::UserError},
};
use serde::{Deserialize, Serialize};
use sqlx::error::ErrorKind;
use std::fmt;
use validator::ValidationErrors;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Pseudo-field for errors not tied to one input field
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Field validation failed (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Single-field validation error
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail::new(field, message)])
    }
}

/// Flattens `validator` output into details, sorted by field
pub fn validation_details(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value.".to_string()),
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// Collects validation details from several checks and fails if any exist
///
/// ```
/// use recipe_api::error::{ensure_valid, ValidationErrorDetail};
///
/// assert!(ensure_valid(Vec::new()).is_ok());
/// assert!(ensure_valid(vec![ValidationErrorDetail::new("name", "This field may not be blank.")]).is_err());
/// ```
pub fn ensure_valid(details: Vec<ValidationErrorDetail>) -> ApiResult<()> {
    if details.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationError(details))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
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

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::ValidationError(validation_details(&errors))
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Not found.".to_string()),
            sqlx::Error::Database(db_err) => match constraint_rejection(db_err.kind()) {
                Some(err) => {
                    tracing::debug!(constraint = ?db_err.constraint(), "Constraint rejected write");
                    err
                }
                None => ApiError::InternalError(format!("Database error: {}", db_err)),
            },
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Unique and check violations stem from the payload; other constraint
/// failures are server faults
fn constraint_rejection(kind: ErrorKind) -> Option<ApiError> {
    match kind {
        ErrorKind::UniqueViolation => Some(ApiError::BadRequest(
            "A record with these values already exists.".to_string(),
        )),
        ErrorKind::CheckViolation => {
            Some(ApiError::BadRequest("A value is out of range.".to_string()))
        }
        _ => None,
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::EmailRequired => ApiError::field("email", "This field is required."),
            UserError::DuplicateEmail => {
                ApiError::field("email", "user with this email already exists.")
            }
            UserError::Password(e) => e.into(),
            UserError::Database(e) => e.into(),
        }
    }
}

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        let invalid_pks = |field: &str, ids: Vec<uuid::Uuid>| {
            ApiError::ValidationError(
                ids.into_iter()
                    .map(|id| {
                        ValidationErrorDetail::new(
                            field,
                            format!("Invalid pk \"{}\" - object does not exist.", id),
                        )
                    })
                    .collect(),
            )
        };

        match err {
            RecipeError::UnknownTags(ids) => invalid_pks("tags", ids),
            RecipeError::UnknownIngredients(ids) => invalid_pks("ingredients", ids),
            RecipeError::Database(e) => e.into(),
        }
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DatabaseError(msg) => ApiError::InternalError(msg),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}
