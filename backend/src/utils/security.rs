use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

pub const RESET_TOKEN_BYTES: usize = 32;

/// Hex-encoded random secret drawn from the operating system CSPRNG.
pub fn generate_token(num_bytes: usize) -> String {
    let mut bytes = vec![0u8; num_bytes];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn generate_reset_token() -> String {
    generate_token(RESET_TOKEN_BYTES)
}

pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_token_is_64_hex_chars() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn reset_tokens_do_not_repeat() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }

    #[test]
    fn sha256_hex_is_stable() {
        assert_eq!(sha256_hex("token"), sha256_hex("token"));
        assert_ne!(sha256_hex("token"), sha256_hex("other"));
        assert_eq!(sha256_hex("").len(), 64);
    }
}
