/// User model and account creation rules
///
/// The email address is the login identifier. It is normalized (trimmed and
/// lower-cased) before it is stored or looked up, so uniqueness is
/// case-insensitive. Passwords are stored as Argon2id hashes and the hash is
/// never serialized.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     name VARCHAR(255) NOT NULL DEFAULT '',
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     is_staff BOOLEAN NOT NULL DEFAULT FALSE,
///     is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use recipe_shared::models::user::{ExtraFields, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let user = User::create_user(&pool, Some("test@LONDON.CZ"), "test3214", ExtraFields::default()).await?;
/// assert_eq!(user.email, "test@london.cz");
/// assert!(user.check_password("test3214")?);
///
/// let admin = User::create_superuser(&pool, Some("admin@london.com"), "123").await?;
/// assert!(admin.is_staff && admin.is_superuser);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::password::{burn_hash, hash_password, verify_password, PasswordError};

/// Name of the unique constraint on `users.email`
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

const USER_COLUMNS: &str = "id, email, password_hash, name, is_active, is_staff, is_superuser, created_at, updated_at";

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Normalized (lower-case) email address
    pub email: String,

    /// Argon2id PHC hash; never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Display name (may be empty)
    pub name: String,

    /// Inactive users cannot obtain or use tokens
    pub is_active: bool,

    /// May access administrative tooling
    pub is_staff: bool,

    /// Has every permission
    pub is_superuser: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Optional fields accepted by [`User::create_user`]
///
/// Unset flags fall back to the column defaults: active, not staff,
/// not superuser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtraFields {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

/// Errors from account creation and authentication
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Email missing or blank
    #[error("Users must have an email address")]
    EmailRequired,

    /// Another account already uses the normalized email
    #[error("A user with this email already exists")]
    DuplicateEmail,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Normalizes an email address for storage and lookup
///
/// Trims surrounding whitespace and lower-cases the whole address.
///
/// # Errors
///
/// Returns `UserError::EmailRequired` when the email is absent or blank.
///
/// ```
/// use recipe_shared::models::user::normalize_email;
///
/// assert_eq!(normalize_email(Some(" test@LONDON.CZ ")).unwrap(), "test@london.cz");
/// assert!(normalize_email(None).is_err());
/// assert!(normalize_email(Some("   ")).is_err());
/// ```
pub fn normalize_email(email: Option<&str>) -> Result<String, UserError> {
    let email = email.map(str::trim).unwrap_or_default();

    if email.is_empty() {
        return Err(UserError::EmailRequired);
    }

    Ok(email.to_lowercase())
}

fn is_email_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT),
        _ => false,
    }
}

impl User {
    /// Creates a user account
    ///
    /// The email is normalized and the password hashed before anything is
    /// written; exactly one row is inserted on success.
    ///
    /// # Errors
    ///
    /// - `UserError::EmailRequired` if `email` is `None` or blank
    /// - `UserError::DuplicateEmail` if the normalized email is taken
    /// - `UserError::Password` / `UserError::Database` on infrastructure failure
    pub async fn create_user(
        pool: &PgPool,
        email: Option<&str>,
        password: &str,
        extra: ExtraFields,
    ) -> Result<Self, UserError> {
        let email = normalize_email(email)?;
        let password_hash = hash_password(password)?;

        let query = format!(
            r#"
            INSERT INTO users (email, password_hash, name, is_active, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(&email)
            .bind(password_hash)
            .bind(extra.name.unwrap_or_default())
            .bind(extra.is_active.unwrap_or(true))
            .bind(extra.is_staff.unwrap_or(false))
            .bind(extra.is_superuser.unwrap_or(false))
            .fetch_one(pool)
            .await
            .map_err(|e| {
                if is_email_conflict(&e) {
                    debug!(email = %email, "Rejected duplicate email");
                    UserError::DuplicateEmail
                } else {
                    UserError::Database(e)
                }
            })?;

        info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    /// Creates a user with `is_staff` and `is_superuser` forced on
    pub async fn create_superuser(
        pool: &PgPool,
        email: Option<&str>,
        password: &str,
    ) -> Result<Self, UserError> {
        Self::create_user(
            pool,
            email,
            password,
            ExtraFields {
                is_staff: Some(true),
                is_superuser: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    /// Checks a plaintext password against the stored hash
    pub fn check_password(&self, password: &str) -> Result<bool, PasswordError> {
        verify_password(password, &self.password_hash)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email; the argument is normalized before lookup
    ///
    /// A blank email never matches.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let Ok(email) = normalize_email(Some(email)) else {
            return Ok(None);
        };

        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Verifies credentials
    ///
    /// Returns `None` for an unknown email, a wrong password or an inactive
    /// account, without distinguishing between them. An unknown email still
    /// pays for one password hash.
    pub async fn authenticate(
        pool: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<Option<Self>, UserError> {
        let Some(user) = Self::find_by_email(pool, email).await? else {
            burn_hash(password);
            return Ok(None);
        };

        if !user.check_password(password)? || !user.is_active {
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Whether an account uses the given email
    pub async fn exists_with_email(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        Ok(Self::find_by_email(pool, email).await?.is_some())
    }

    /// Counts all users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "test@london.com".to_string(),
            password_hash: hash_password("3214").expect("Hash should succeed"),
            name: "test name".to_string(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_email_lowercases() {
        assert_eq!(normalize_email(Some("test@LONDON.CZ")).unwrap(), "test@london.cz");
        assert_eq!(normalize_email(Some("Test@Example.COM")).unwrap(), "test@example.com");
    }

    #[test]
    fn test_normalize_email_trims() {
        assert_eq!(normalize_email(Some("  pako@seznam.cz\n")).unwrap(), "pako@seznam.cz");
    }

    #[test]
    fn test_normalize_email_required() {
        assert!(matches!(normalize_email(None), Err(UserError::EmailRequired)));
        assert!(matches!(normalize_email(Some("")), Err(UserError::EmailRequired)));
        assert!(matches!(normalize_email(Some(" \t ")), Err(UserError::EmailRequired)));
    }

    #[test]
    fn test_check_password() {
        let user = sample_user();
        assert!(user.check_password("3214").unwrap());
        assert!(!user.check_password("wrong").unwrap());
    }

    #[test]
    fn test_serialized_user_has_no_password() {
        let value = serde_json::to_value(sample_user()).unwrap();
        assert!(value.get("password_hash").is_none());
        assert!(value.get("password").is_none());
        assert_eq!(value["email"], "test@london.com");
    }

    #[test]
    fn test_display_is_email() {
        assert_eq!(sample_user().to_string(), "test@london.com");
    }

    #[test]
    fn test_extra_fields_default_is_empty() {
        let extra = ExtraFields::default();
        assert!(extra.name.is_none());
        assert!(extra.is_active.is_none());
        assert!(extra.is_staff.is_none());
        assert!(extra.is_superuser.is_none());
    }

    #[test]
    fn test_user_error_messages() {
        assert_eq!(
            UserError::EmailRequired.to_string(),
            "Users must have an email address"
        );
        assert_eq!(
            UserError::DuplicateEmail.to_string(),
            "A user with this email already exists"
        );
    }
}
