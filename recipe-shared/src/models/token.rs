/// Auth token model
///
/// Each user has at most one token. Issuing a token replaces the previous
/// one, so a fresh login invalidates older keys. The plaintext token is only
/// ever returned from [`AuthToken::issue`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE auth_tokens (
///     user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
///     token_hash VARCHAR(64) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::user::User;
use crate::auth::token::{generate_token, hash_token};

/// Stored token record (hash only)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthToken {
    pub user_id: Uuid,

    /// HMAC-SHA256 of the plaintext token
    #[serde(skip_serializing)]
    pub token_hash: String,

    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    /// Issues a new token for `user_id`, replacing any existing one
    ///
    /// Returns the plaintext token.
    pub async fn issue(pool: &PgPool, user_id: Uuid, secret: &str) -> Result<String, sqlx::Error> {
        let token = generate_token();

        sqlx::query(
            r#"
            INSERT INTO auth_tokens (user_id, token_hash)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET token_hash = EXCLUDED.token_hash, created_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(hash_token(&token, secret))
        .execute(pool)
        .await?;

        info!(user_id = %user_id, "Issued auth token");
        Ok(token)
    }

    /// Resolves a token hash to its active owner
    pub async fn find_user(pool: &PgPool, token_hash: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.password_hash, u.name, u.is_active, u.is_staff,
                   u.is_superuser, u.created_at, u.updated_at
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_hash = $1 AND u.is_active
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }

    /// Finds the token record of a user
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AuthToken>(
            "SELECT user_id, token_hash, created_at FROM auth_tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Deletes the token of a user; returns whether one existed
    pub async fn revoke(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
