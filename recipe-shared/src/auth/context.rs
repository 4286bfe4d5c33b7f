/// Request authentication context
///
/// [`TokenAuth`] resolves an `Authorization` header value to an active user
/// and yields an [`AuthContext`]. The API server runs it in a middleware layer
/// and inserts the context into request extensions; handlers take the owner
/// id from that context rather than from any ambient state.
///
/// # Example
///
/// ```no_run
/// use recipe_shared::auth::context::TokenAuth;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let auth = TokenAuth::new(pool, "a-secret-key-that-is-at-least-32-bytes");
/// let context = auth.authenticate(Some("Token 0123456789abcdefghij0123456789abcdefghij")).await?;
/// println!("Request made by {}", context.email);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::token::{hash_token, parse_authorization_header, validate_token_format};
use crate::models::{token::AuthToken, user::User};

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID; owner of everything the request creates
    pub user_id: Uuid,

    /// Normalized email of the caller
    pub email: String,
}

impl AuthContext {
    /// Builds the context for an authenticated user
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Token authentication failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header
    #[error("Authentication credentials were not provided.")]
    MissingCredentials,

    /// Header present but not `Token <key>` / `Bearer <key>`
    #[error("Invalid token header: {0}")]
    InvalidFormat(String),

    /// Token unknown, replaced, or owned by an inactive user
    #[error("Invalid token.")]
    InvalidToken,

    /// Token lookup failed
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Everything needed to resolve a token
#[derive(Clone)]
pub struct TokenAuth {
    /// Database pool used for the token lookup
    pub pool: PgPool,

    /// Server secret keying the stored token hashes
    pub secret: Arc<str>,
}

impl TokenAuth {
    pub fn new(pool: PgPool, secret: impl Into<Arc<str>>) -> Self {
        Self {
            pool,
            secret: secret.into(),
        }
    }

    /// Resolves an `Authorization` header value to the calling user
    ///
    /// Malformed tokens are rejected before any database access.
    pub async fn authenticate(&self, header_value: Option<&str>) -> Result<AuthContext, AuthError> {
        let header_value = header_value.ok_or(AuthError::MissingCredentials)?;

        let token = parse_authorization_header(header_value)
            .ok_or_else(|| AuthError::InvalidFormat("expected `Token <key>`".to_string()))?;

        if !validate_token_format(token) {
            return Err(AuthError::InvalidToken);
        }

        let user = AuthToken::find_user(&self.pool, &hash_token(token, &self.secret))
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidToken)?;

        debug!(user_id = %user.id, "Token authenticated");
        Ok(AuthContext::from_user(&user))
    }
}
