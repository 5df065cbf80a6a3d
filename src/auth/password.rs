/// Password Hashing and Verification
///
/// bcrypt embeds a fresh random salt and the cost factor in every hash,
/// so the stored string is all that is needed to verify later.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AuthError;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `HashingFailure` only if bcrypt itself fails (entropy or
/// resource problems). Input strength is checked at the request boundary.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash(password, DEFAULT_COST).map_err(|e| {
        tracing::error!(error = %e, "bcrypt hashing failed");
        AuthError::HashingFailure
    })
}

/// Verify a password against its stored hash
///
/// A wrong password is `Ok(false)`. bcrypt compares digests without
/// early exit.
///
/// # Errors
/// Returns `HashingFailure` if the stored hash is malformed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
    verify(password, password_hash).map_err(|e| {
        tracing::error!(error = %e, "Stored password hash could not be parsed");
        AuthError::HashingFailure
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "ValidPassword123";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        // bcrypt identifier
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("pw1").expect("Failed to hash password");

        let is_valid = verify_password("pw1", &hash).expect("Failed to verify password");
        assert!(is_valid);
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("pw1").expect("Failed to hash password");

        let is_valid = verify_password("pw2", &hash).expect("Failed to verify password");
        assert!(!is_valid);
    }

    #[test]
    fn test_same_password_different_salt() {
        let first = hash_password("pw1").unwrap();
        let second = hash_password("pw1").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("pw1", &first).unwrap());
        assert!(verify_password("pw1", &second).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        let result = verify_password("pw1", "not-a-bcrypt-hash");
        assert_eq!(result, Err(AuthError::HashingFailure));
    }
}
