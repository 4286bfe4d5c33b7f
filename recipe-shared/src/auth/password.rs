/// Password hashing using Argon2id
///
/// Passwords are stored as PHC strings (`$argon2id$v=19$m=...`), which embed
/// the algorithm, parameters and salt, so verification needs nothing but the
/// stored string.
///
/// # Parameters
///
/// - Memory: 19 MiB
/// - Iterations: 2
/// - Parallelism: 1
///
/// # Example
///
/// ```
/// use recipe_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("883214")?;
/// assert!(verify_password("883214", &hash)?);
/// assert!(!verify_password("3214", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Shortest password accepted by the account creation endpoint
pub const MIN_PASSWORD_LENGTH: usize = 6;

const M_COST_KIB: u32 = 19_456;
const T_COST: u32 = 2;
const P_COST: u32 = 1;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Stored hash is not a valid PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(M_COST_KIB)
        .t_cost(T_COST)
        .p_cost(P_COST)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password with a fresh random salt
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored PHC hash
///
/// Returns `Ok(false)` for a wrong password and `Err` only when the stored
/// hash itself is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Runs one hash of `password` and discards the result
///
/// Called when there is no stored hash to verify against, so that a lookup
/// miss costs as much as a wrong password.
pub fn burn_hash(password: &str) {
    if let Err(e) = hash_password(password) {
        tracing::warn!(error = %e, "Dummy password hash failed");
    }
}

/// Checks the minimum password length
///
/// Length is counted in characters, not bytes.
///
/// ```
/// use recipe_shared::auth::password::validate_password_length;
///
/// assert!(validate_password_length("883214").is_ok());
/// assert!(validate_password_length("3214").is_err());
/// ```
pub fn validate_password_length(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Ensure this field has at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_format() {
        let hash = hash_password("test_password_123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=19456"));
        assert!(hash.contains("t=2"));
        assert!(hash.contains("p=1"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_password").expect("Hash 1 should succeed");
        let hash2 = hash_password("same_password").expect("Hash 2 should succeed");

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("883214").expect("Hash should succeed");
        assert!(verify_password("883214", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("makopakokoko").expect("Hash should succeed");
        assert!(!verify_password("verywrongpassword", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_empty() {
        let hash = hash_password("password").expect("Hash should succeed");
        assert!(!verify_password("", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("password", "invalid_hash").is_err());
        assert!(verify_password("password", "$argon2id$v=19$m=abc").is_err());

        // Structurally valid but hashless strings must never verify
        assert!(!matches!(
            verify_password("password", "$argon2id$invalid"),
            Ok(true)
        ));
    }

    #[test]
    fn test_burn_hash_does_not_panic() {
        burn_hash("");
        burn_hash("876543210");
    }

    #[test]
    fn test_hash_verify_unicode() {
        for password in ["with spaces", "unicode-密码-パスワード", "3214"] {
            let hash = hash_password(password).expect("Hash should succeed");
            assert!(verify_password(password, &hash).expect("Verify should succeed"));
        }
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password_length("883214").is_ok());
        assert!(validate_password_length("876543210").is_ok());

        let err = validate_password_length("3214").unwrap_err();
        assert!(err.contains("at least 6 characters"));
        assert!(validate_password_length("").is_err());
    }

    #[test]
    fn test_validate_password_length_counts_chars() {
        // 6 characters, 18 bytes
        assert!(validate_password_length("密码密码密码").is_ok());
        // 5 characters, 15 bytes
        assert!(validate_password_length("密码密码密").is_err());
    }
}
