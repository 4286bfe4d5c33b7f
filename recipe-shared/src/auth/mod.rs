/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and the minimum-length rule
/// - [`token`]: Opaque bearer token generation and keyed hashing
/// - [`context`]: Token resolution and the per-request `AuthContext`
///
/// # Example
///
/// ```
/// use recipe_shared::auth::password::{hash_password, verify_password};
/// use recipe_shared::auth::token::{generate_token, hash_token};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("883214")?;
/// assert!(verify_password("883214", &hash)?);
///
/// let token = generate_token();
/// let stored = hash_token(&token, "a-secret-key-that-is-at-least-32-bytes");
/// assert_eq!(stored.len(), 64);
/// # Ok(())
/// # }
/// ```

pub mod context;
pub mod password;
pub mod token;
