//! Randomized RSA-OAEP (SHA-256) public-key encryption.

use base64::{engine::general_purpose, Engine as _};
use rand::rngs::OsRng;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::{Error, Result};

/// Encrypt `message` to `public_key` with OAEP-SHA256 and return standard base64.
///
/// Output differs on every call for the same inputs.
///
/// # Errors
///
/// Returns [`Error::Encrypt`] if `message` is longer than `k - 2*32 - 2` bytes,
/// where `k` is the modulus size in bytes.
pub fn encrypt_oaep(message: &[u8], public_key: &RsaPublicKey) -> Result<String> {
    let mut rng = OsRng;
    let ciphertext = public_key
        .encrypt(&mut rng, Oaep::new::<Sha256>(), message)
        .map_err(|e| Error::Encrypt(e.to_string()))?;
    Ok(general_purpose::STANDARD.encode(ciphertext))
}

/// Decrypt a base64 OAEP-SHA256 ciphertext with `private_key`.
///
/// # Errors
///
/// Returns [`Error::Decode`] for malformed base64 and [`Error::Decrypt`] when
/// the padding does not check out (corrupt data or the wrong key).
pub fn decrypt_oaep(ciphertext: &str, private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
    let ciphertext = general_purpose::STANDARD.decode(ciphertext)?;
    let mut rng = OsRng;
    private_key
        .decrypt_blinded(&mut rng, Oaep::new::<Sha256>(), &ciphertext)
        .map_err(|e| Error::Decrypt(e.to_string()))
}
