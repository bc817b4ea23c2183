//! bcrypt password hashing and verification for admin credentials.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use tracing::warn;

/// Cost factor for newly hashed admin passwords.
pub const BCRYPT_COST: u32 = 12;

// Verified against when the account does not exist, so unknown emails cost the
// same as wrong passwords.
static TIMING_PAD_HASH: Lazy<Option<String>> =
    Lazy::new(|| bcrypt::hash("storefront-timing-pad", BCRYPT_COST).ok());

/// Hash a plaintext password for storage in `admins.password_hash`.
///
/// # Errors
/// Returns an error if bcrypt fails to generate a salt or hash.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, BCRYPT_COST).context("failed to hash password")
}

/// Compare a plaintext password with a stored bcrypt hash.
///
/// A malformed hash never matches.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(err) => {
            warn!("Stored password hash could not be verified: {err}");
            false
        }
    }
}

/// Verify `password` against the stored hash, or burn an equivalent amount of
/// work when there is no account. Always `false` without a hash.
pub(super) fn verify_or_pad(password: &str, hash: Option<&str>) -> bool {
    if let Some(hash) = hash {
        return verify_password(password, hash);
    }
    if let Some(pad) = TIMING_PAD_HASH.as_deref() {
        let _ = bcrypt::verify(password, pad);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cost 4 keeps the suite fast; verification reads the cost from the hash.
    fn quick_hash(password: &str) -> String {
        bcrypt::hash(password, 4).unwrap_or_default()
    }

    #[test]
    fn verify_password_accepts_matching_hash() {
        let hash = quick_hash("Chuk-i-Klyuch-42");
        assert!(verify_password("Chuk-i-Klyuch-42", &hash));
    }

    #[test]
    fn verify_password_rejects_other_passwords() {
        let hash = quick_hash("correct horse");
        for candidate in ["correct horse ", "Correct horse", "", "парола"] {
            assert!(!verify_password(candidate, &hash), "{candidate:?} matched");
        }
    }

    #[test]
    fn verify_password_handles_cyrillic_passwords() {
        let hash = quick_hash("отвертка");
        assert!(verify_password("отвертка", &hash));
        assert!(!verify_password("отвертки", &hash));
    }

    #[test]
    fn verify_password_rejects_malformed_hash() {
        assert!(!verify_password("secret", "not-a-bcrypt-hash"));
        assert!(!verify_password("secret", ""));
    }

    #[test]
    fn verify_or_pad_without_account_is_false() {
        assert!(!verify_or_pad("anything", None));
    }

    #[test]
    fn hash_password_uses_configured_cost() -> Result<()> {
        let hash = hash_password("seed-password")?;
        assert!(hash.starts_with("$2b$12$"), "unexpected prefix: {hash}");
        assert!(verify_password("seed-password", &hash));
        Ok(())
    }
}
