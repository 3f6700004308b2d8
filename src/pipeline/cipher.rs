//! Password-based payload encryption.
//!
//! Key derivation is PBKDF2-HMAC-SHA256 with a fresh random salt per call;
//! the cipher is ChaCha20-Poly1305. Output layout:
//!
//! ```text
//! salt (16) || nonce (12) || ciphertext || tag (16)
//! ```

use crate::error::{Result, StegoError};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use hmac::Hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
pub const KEY_LEN: usize = 32;
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Bytes added on top of the plaintext length
pub const OVERHEAD: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut *key)
        .map_err(|_| StegoError::InvalidConfig("key derivation failed".into()))?;
    Ok(key)
}

pub fn encrypt(plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(password, &salt)?;
    let cipher = ChaCha20Poly1305::new_from_slice(&*key)
        .map_err(|_| StegoError::InvalidConfig("invalid key length".into()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| StegoError::InvalidConfig("payload encryption failed".into()))?;

    let mut out = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Wrong password and corrupted ciphertext both surface as `DecryptionFailure`
pub fn decrypt(data: &[u8], password: &str) -> Result<Vec<u8>> {
    if data.len() < OVERHEAD {
        return Err(StegoError::DecryptionFailure);
    }
    let (salt, rest) = data.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let key = derive_key(password, salt)?;
    let cipher =
        ChaCha20Poly1305::new_from_slice(&*key).map_err(|_| StegoError::DecryptionFailure)?;
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| StegoError::DecryptionFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let sealed = encrypt(b"attack at dawn", "pw").unwrap();
        assert_eq!(sealed.len(), 14 + OVERHEAD);
        assert_eq!(decrypt(&sealed, "pw").unwrap(), b"attack at dawn");
    }

    #[test]
    fn test_salt_is_fresh_per_call() {
        let a = encrypt(b"same", "pw").unwrap();
        let b = encrypt(b"same", "pw").unwrap();
        assert_ne!(a[..SALT_LEN], b[..SALT_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_password_fails() {
        let sealed = encrypt(b"secret", "right").unwrap();
        assert!(matches!(
            decrypt(&sealed, "wrong"),
            Err(StegoError::DecryptionFailure)
        ));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let mut sealed = encrypt(b"secret", "pw").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(matches!(
            decrypt(&sealed, "pw"),
            Err(StegoError::DecryptionFailure)
        ));
    }

    #[test]
    fn test_truncated_input_fails() {
        assert!(matches!(
            decrypt(&[0u8; OVERHEAD - 1], "pw"),
            Err(StegoError::DecryptionFailure)
        ));
    }
}
