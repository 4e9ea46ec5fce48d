use argon2::{
    password_hash::{phc::PasswordHash, PasswordHasher, PasswordVerifier},
    Argon2,
};

use crate::error::{AppError, AppResult};

/// Prefix shared by every bcrypt variant (`$2a$`, `$2b$`, `$2y$`)
const BCRYPT_PREFIX: &str = "$2";

/// Hash a password using Argon2id
///
/// The result is a PHC string carrying its own salt and parameters.
pub fn hash_password(password: &str) -> AppResult<String> {
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes())
        .map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("failed to hash password: {}", e),
        })?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a stored hash
///
/// Accepts Argon2 PHC strings and bcrypt hashes carried over from earlier
/// deployments. A wrong password is `Ok(false)`; a stored hash that cannot
/// be parsed is an internal error.
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    if is_legacy_hash(password_hash) {
        return bcrypt::verify(password, password_hash).map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("malformed bcrypt hash: {}", e),
        });
    }

    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("malformed password hash: {}", e),
    })?;
    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Whether `password_hash` was produced by bcrypt
pub fn is_legacy_hash(password_hash: &str) -> bool {
    password_hash.starts_with(BCRYPT_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("correct horse").expect("Failed to hash password");

        assert!(hash.starts_with("$argon2"));
        assert!(!is_legacy_hash(&hash));
        assert!(!hash.contains("correct horse"));
    }

    #[test]
    fn test_verify_password_success_and_failure() {
        let hash = hash_password("correct horse").expect("Failed to hash password");

        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hash1 = hash_password("pw").expect("Failed to hash password");
        let hash2 = hash_password("pw").expect("Failed to hash password");

        // Different salts
        assert_ne!(hash1, hash2);
        assert!(verify_password("pw", &hash1).unwrap());
        assert!(verify_password("pw", &hash2).unwrap());
    }

    #[test]
    fn test_verify_legacy_bcrypt_hash() {
        let legacy = bcrypt::hash("old-secret", 4).unwrap();
        assert!(is_legacy_hash(&legacy));

        assert!(verify_password("old-secret", &legacy).unwrap());
        assert!(!verify_password("new-secret", &legacy).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        let err = verify_password("pw", "not-a-hash").unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
