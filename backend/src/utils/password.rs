use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};

/// One-way salted hashing of account passwords.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> anyhow::Result<String>;

    /// `Ok(false)` on mismatch; `Err` only when the stored digest is unusable.
    fn verify(&self, plaintext: &str, digest: &str) -> anyhow::Result<bool>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> anyhow::Result<String> {
        hash_password(plaintext)
    }

    fn verify(&self, plaintext: &str, digest: &str) -> anyhow::Result<bool> {
        verify_password(plaintext, digest)
    }
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    Ok(password_hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification error: {}", e)),
    }
}
