use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use std::sync::LazyLock;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use tracing::warn;

use crate::{Result, StoreError};

/// Hash with Argon2id, default cost, fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Hash(e.to_string()))
}

/// Hashed once at the default cost so that a login with no stored hash to
/// check still pays for one full verification.
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("sesame-decoy-password").ok());

/// Runs one Argon2 verification against [`DECOY_HASH`] and discards the
/// result.
pub fn verify_decoy(password: &str) {
    if let Some(parsed) = DECOY_HASH.as_deref().and_then(|h| PasswordHash::new(h).ok()) {
        let _ = Argon2::default().verify_password(password.as_bytes(), &parsed);
    }
}

/// An empty stored hash (Google-only account) never matches.
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    if stored_hash.is_empty() {
        verify_decoy(password);
        return false;
    }

    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Unparsable password hash in users table: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert_ne!(hash, "hunter22");
        assert!(verify_password(&hash, "hunter22"));
        assert!(!verify_password(&hash, "hunter23"));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn empty_or_garbage_hash_rejects() {
        assert!(!verify_password("", ""));
        assert!(!verify_password("", "anything"));
        assert!(!verify_password("not-a-phc-string", "anything"));
    }

    #[test]
    fn decoy_hash_is_a_real_argon2_hash() {
        let decoy = DECOY_HASH.as_deref().unwrap();
        let parsed = PasswordHash::new(decoy).unwrap();
        assert_eq!(parsed.algorithm, argon2::Algorithm::Argon2id.ident());
        assert!(verify_password(decoy, "sesame-decoy-password"));

        // Returns nothing, so no input can turn it into a successful login.
        verify_decoy("sesame-decoy-password");
        verify_decoy("");
    }
}
