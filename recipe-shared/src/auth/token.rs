/// Opaque bearer tokens
///
/// Tokens are 40 random alphanumeric characters handed to the client once.
/// Only an HMAC-SHA256 of the token, keyed with the server secret, is stored,
/// so a leaked `auth_tokens` table cannot be replayed without the secret.
///
/// Clients present the token as `Authorization: Token <key>`; the
/// `Bearer <key>` scheme is accepted as well.
///
/// # Example
///
/// ```
/// use recipe_shared::auth::token::{generate_token, hash_token, validate_token_format};
///
/// let token = generate_token();
/// assert_eq!(token.len(), 40);
/// assert!(validate_token_format(&token));
///
/// let secret = "a-secret-key-that-is-at-least-32-bytes";
/// assert_eq!(hash_token(&token, secret), hash_token(&token, secret));
/// ```

use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, Rng};
use sha2::Sha256;

/// Length of an issued token
pub const TOKEN_LENGTH: usize = 40;

type HmacSha256 = Hmac<Sha256>;

/// Generates a new random token
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Hashes a token with HMAC-SHA256 keyed by `secret`
///
/// Returns 64 lowercase hex characters.
pub fn hash_token(token: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Checks that a presented token could have been issued by [`generate_token`]
pub fn validate_token_format(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Extracts the token from an `Authorization` header value
///
/// Accepts `Token <key>` and `Bearer <key>` (scheme is case-insensitive).
/// Returns `None` for any other scheme or an empty key.
pub fn parse_authorization_header(value: &str) -> Option<&str> {
    let (scheme, key) = value.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let key = key.trim();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_generate_token_format() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(validate_token_format(&token));
    }

    #[test]
    fn test_generate_token_unique() {
        let tokens: std::collections::HashSet<String> = (0..100).map(|_| generate_token()).collect();
        assert_eq!(tokens.len(), 100);
    }

    #[test]
    fn test_hash_token_deterministic() {
        let token = generate_token();
        let hash = hash_token(&token, SECRET);

        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash_token(&token, SECRET));
    }

    #[test]
    fn test_hash_token_depends_on_secret() {
        let token = generate_token();
        assert_ne!(
            hash_token(&token, SECRET),
            hash_token(&token, "another-secret-key-at-least-32-bytes")
        );
    }

    #[test]
    fn test_validate_token_format_rejects_bad_input() {
        assert!(!validate_token_format(""));
        assert!(!validate_token_format("short"));
        assert!(!validate_token_format(&"a".repeat(41)));
        assert!(!validate_token_format(&format!("{}!", "a".repeat(39))));
    }

    #[test]
    fn test_parse_authorization_header() {
        assert_eq!(parse_authorization_header("Token abc123"), Some("abc123"));
        assert_eq!(parse_authorization_header("Bearer abc123"), Some("abc123"));
        assert_eq!(parse_authorization_header("token abc123"), Some("abc123"));
        assert_eq!(parse_authorization_header("Basic abc123"), None);
        assert_eq!(parse_authorization_header("Token "), None);
        assert_eq!(parse_authorization_header("abc123"), None);
    }
}
