use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

/// Fast, weak argon2 settings for local runs and tests.
static INSECURE_HASHING: LazyLock<bool> =
    LazyLock::new(|| std::env::var("INSECURE_PASSWORD_HASHING").is_ok());

/// A freshly issued bearer token. `plaintext` goes to the client once;
/// only `digest` is persisted.
pub struct SessionToken {
    pub plaintext: String,
    pub digest: String,
}

impl SessionToken {
    pub fn issue() -> Self {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let plaintext = hex::encode(bytes);
        let digest = digest_token(&plaintext);
        Self { plaintext, digest }
    }
}

/// SHA-256 of a bearer token, hex encoded.
pub fn digest_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn hasher() -> Argon2<'static> {
    if !*INSECURE_HASHING {
        return Argon2::default();
    }
    // NOT SECURE FOR PRODUCTION
    Params::new(1024, 1, 1, None)
        .map(|params| Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
        .unwrap_or_default()
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(hasher()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// False for a wrong password and for a stored hash that does not parse.
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| hasher().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not a phc string"));
    }

    #[test]
    fn test_issued_tokens() {
        let a = SessionToken::issue();
        assert_eq!(a.plaintext.len(), 64);
        assert_ne!(a.plaintext, SessionToken::issue().plaintext);
        assert_eq!(a.digest, digest_token(&a.plaintext));
        assert_ne!(a.digest, a.plaintext);
    }
}
