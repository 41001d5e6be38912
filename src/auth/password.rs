use tracing::error;

use crate::errors::{Error, Result};

/// bcrypt work factor.
const COST: u32 = 12;

/// bcrypt reads at most 72 bytes of input; longer plaintexts are rejected
/// rather than silently truncated.
const MAX_PASSWORD_BYTES: usize = 72;

pub fn hash_password(plain: &str) -> Result<String> {
    if plain.len() > MAX_PASSWORD_BYTES {
        return Err(Error::Hashing("password longer than 72 bytes".into()));
    }
    bcrypt::hash(plain, COST).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        Error::Hashing(e.to_string())
    })
}

/// Returns `Ok(false)` on mismatch. A wrong password is a negative result,
/// not an error; errors are reserved for a malformed stored hash or a
/// primitive failure.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(plain, hash).map_err(|e| {
        error!(error = %e, "bcrypt verify error");
        Error::Hashing(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn hashing_is_salted() {
        let password = "same-input";
        let first = hash_password(password).expect("hashing should succeed");
        let second = hash_password(password).expect("hashing should succeed");
        assert_ne!(first, second);
        assert!(verify_password(password, &first).expect("verify"));
        assert!(verify_password(password, &second).expect("verify"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, Error::Hashing(_)));
    }

    #[test]
    fn hash_rejects_over_limit_input() {
        let too_long = "x".repeat(73);
        let err = hash_password(&too_long).unwrap_err();
        assert!(matches!(err, Error::Hashing(_)));
    }
}
