//! PKCS1 v1.5 signatures over SHA-256 digests.

use base64::{engine::general_purpose, Engine as _};
use rand::rngs::OsRng;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Sign the SHA-256 digest of `message` and return the base64-encoded signature.
///
/// # Arguments
///
/// * `message` - The data to sign
/// * `private_key` - The signer's RSA private key
///
/// # Returns
///
/// Standard base64 of the raw signature bytes. PKCS1 v1.5 is deterministic, so
/// the same key and message always produce the same string.
///
/// # Errors
///
/// Returns [`Error::Sign`] if the key cannot produce a signature (for example
/// a modulus too small for the DigestInfo encoding).
pub fn sign(message: &[u8], private_key: &RsaPrivateKey) -> Result<String> {
    let hashed = Sha256::digest(message);
    // The RNG only blinds the private-key operation.
    let mut rng = OsRng;
    let signature = private_key
        .sign_with_rng(&mut rng, Pkcs1v15Sign::new::<Sha256>(), &hashed)
        .map_err(|e| Error::Sign(e.to_string()))?;
    Ok(general_purpose::STANDARD.encode(signature))
}

/// Verify a base64 signature over `message`.
///
/// # Returns
///
/// `true` only if the signature decodes and matches. A malformed signature,
/// a different message or the wrong key all yield `false`.
pub fn verify(signature: &str, message: &[u8], public_key: &RsaPublicKey) -> bool {
    let signature = match general_purpose::STANDARD.decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let hashed = Sha256::digest(message);

    match public_key.verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, &signature) {
        Ok(()) => true,
        Err(_) => false,
    }
}
