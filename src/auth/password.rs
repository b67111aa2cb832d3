use anyhow::anyhow;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// One-way salted digest in PHC string form.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            anyhow!("hash password: {e}")
        })
}

/// `Ok(false)` on mismatch; `Err` only when the stored digest is unparseable.
pub fn verify_password(plain: &str, digest: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(digest).map_err(|e| {
        error!(error = %e, "stored password digest is malformed");
        anyhow!("parse password digest: {e}")
    })?;
    Ok(Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_verifies_original_only() {
        let digest = hash_password("correct-horse-battery-staple").unwrap();
        assert!(digest.starts_with("$argon2"));
        assert!(verify_password("correct-horse-battery-staple", &digest).unwrap());
        for other in ["wrong-password", "", "correct-horse-battery-stapl", "Correct-horse-battery-staple"] {
            assert!(!verify_password(other, &digest).unwrap(), "accepted {other:?}");
        }
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("same-input-pw").unwrap();
        let b = hash_password("same-input-pw").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same-input-pw", &a).unwrap());
        assert!(verify_password("same-input-pw", &b).unwrap());
    }

    #[test]
    fn malformed_digest_is_an_error() {
        let err = verify_password("anything", "not-a-phc-string").unwrap_err();
        assert!(err.to_string().contains("parse password digest"));
    }
}
