/// User endpoints
///
/// - `POST /user/create` - Create an account
/// - `POST /user/token` - Exchange credentials for an auth token
/// - `GET /user/me` - Profile of the authenticated caller

use crate::{
    app::AppState,
    error::{ensure_valid, validation_details, ApiError, ApiResult, ValidationErrorDetail, NON_FIELD_ERRORS},
    extract::ApiJson,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use recipe_shared::{
    auth::{context::AuthContext, password},
    models::{
        token::AuthToken,
        user::{ExtraFields, User},
    },
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

/// Account creation request
///
/// Absent or `null` fields deserialize as `None` so they are reported per
/// field instead of failing the whole body.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(
        required(message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    pub email: Option<String>,

    /// Length is checked against `password::MIN_PASSWORD_LENGTH`
    #[serde(default)]
    #[validate(required(message = "This field is required."))]
    pub password: Option<String>,

    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub name: Option<String>,
}

/// Public user fields; the password is never part of a response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
        }
    }
}

/// Token request
///
/// Missing fields deserialize as blank so they are reported per field.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Create a new user
///
/// # Endpoint
///
/// ```text
/// POST /user/create
/// Content-Type: application/json
///
/// {
///   "email": "test@gmail.com",
///   "password": "883214",
///   "name": "test name"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// { "email": "test@gmail.com", "name": "test name" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing or invalid email, missing password or one
///   shorter than 6 characters, email already registered, or malformed body.
///   Nothing is persisted.
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let mut details = match req.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => validation_details(&errors),
    };

    if let Some(Err(message)) = req.password.as_deref().map(password::validate_password_length) {
        details.push(ValidationErrorDetail::new("password", message));
    }

    ensure_valid(details)?;

    let password = req.password.unwrap_or_default();
    let name = req.name.unwrap_or_default();

    let user = User::create_user(
        &state.db,
        req.email.as_deref(),
        &password,
        ExtraFields {
            name: Some(name.trim().to_string()),
            ..Default::default()
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Issue an auth token
///
/// # Endpoint
///
/// ```text
/// POST /user/token
/// Content-Type: application/json
///
/// { "email": "pako@seznam.cz", "password": "876543210" }
/// ```
///
/// # Response (200)
///
/// ```json
/// { "token": "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b" }
/// ```
///
/// Every successful call issues a new token and invalidates the previous one.
///
/// # Errors
///
/// - `400 Bad Request`: blank fields, unknown email, wrong password or
///   inactive account. The body does not say which, and has no `token` key.
pub async fn create_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    let user = User::authenticate(&state.db, &req.email, &req.password)
        .await?
        .ok_or_else(|| {
            warn!("Rejected token request with invalid credentials");
            ApiError::field(
                NON_FIELD_ERRORS,
                "Unable to authenticate with provided credentials.",
            )
        })?;

    let token = AuthToken::issue(&state.db, user.id, state.secret_key()).await?;
    info!(user_id = %user.id, "Token issued");

    Ok(Json(TokenResponse { token }))
}

/// Return the authenticated user's public fields
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(Json(user.into()))
}
