use crate::error::{AppError, AppResult};

/// Hashes a credential secret with bcrypt
pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verifies a credential secret against a stored bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low cost factor to keep the test fast; production uses DEFAULT_COST
    fn quick_hash(password: &str) -> String {
        bcrypt::hash(password, 4).unwrap()
    }

    #[test]
    fn test_verify_accepts_matching_password() {
        let hash = quick_hash("Str0ng!pass");
        assert!(verify_password("Str0ng!pass", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hash = quick_hash("Str0ng!pass");
        assert!(!verify_password("other", &hash).unwrap());
    }

    #[test]
    fn test_invalid_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
    }
}
