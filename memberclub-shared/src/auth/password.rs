/// Password hashing using Argon2id
///
/// Hashes are produced in PHC string format, which embeds the algorithm,
/// parameters, and the per-password random salt. Verification therefore needs
/// nothing besides the candidate password and the stored string.
///
/// Every write path that stores a credential must go through [`hash_password`]
/// first; a plaintext password never reaches the repository layer. The single
/// calling convention for verification is `(candidate, digest)`.
///
/// # Example
///
/// ```
/// use memberclub_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Secret1!")?;
/// assert!(verify_password("Secret1!", &hash)?);
/// assert!(!verify_password("guess", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Stored digest is not a valid PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),

    /// Verification failed for a reason other than a mismatch
    #[error("Failed to verify password: {0}")]
    VerifyError(String),
}

/// Hashes a password with Argon2id and a fresh random salt
///
/// Two calls with the same input produce different digests; the salt is
/// embedded in the returned PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verifies a candidate password against a stored digest
///
/// Returns `Ok(false)` for a mismatch; an error is only returned when the
/// stored digest itself is malformed.
pub fn verify_password(candidate: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_argon2id() {
        let hash = hash_password("test_password_123").expect("Hash should succeed");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_correct_password() {
        let hash = hash_password("correct_password").unwrap();
        assert!(verify_password("correct_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("correct_password").unwrap();
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_empty_candidate() {
        let hash = hash_password("password").unwrap();
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_malformed_digest_is_an_error() {
        assert!(verify_password("password", "not-a-phc-string").is_err());
        assert!(verify_password("password", "$argon2id$broken").is_err());
    }

    #[test]
    fn test_roundtrip_unusual_passwords() {
        for password in ["with spaces", "accents-éàç", "p@$$w0rd-#!"] {
            let hash = hash_password(password).unwrap();
            assert!(
                verify_password(password, &hash).unwrap(),
                "password '{}' should verify",
                password
            );
        }
    }
}
