use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use tracing::error;

use crate::i18n::MessageKey;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Registration rule: at least six characters, one ASCII letter and one digit.
pub fn check_strength(plain: &str) -> Result<(), MessageKey> {
    lazy_static! {
        static ref LETTER_RE: Regex = Regex::new(r"[a-zA-Z]").unwrap();
        static ref DIGIT_RE: Regex = Regex::new(r"\d").unwrap();
    }
    if plain.chars().count() < MIN_PASSWORD_LEN {
        return Err(MessageKey::PasswordTooShort);
    }
    if !LETTER_RE.is_match(plain) {
        return Err(MessageKey::PasswordNeedsLetter);
    }
    if !DIGIT_RE.is_match(plain) {
        return Err(MessageKey::PasswordNeedsNumber);
    }
    Ok(())
}
