//! Hybrid envelope: AES-CFB for the message, RSA-OAEP for the AES key.

use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::{oaep, symmetric};

/// A message sealed to a recipient's public key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SealedMessage {
    /// The AES key, OAEP-SHA256 encrypted and standard base64 encoded
    pub encrypted_key: String,
    /// The message in the AES-CFB envelope format
    pub ciphertext: String,
}

impl SealedMessage {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Encrypt `message` under `aes_key` and wrap the key for `recipient`.
///
/// # Errors
///
/// Propagates [`crate::Error::InvalidKey`] for a bad AES key length and
/// [`crate::Error::Encrypt`] if the key does not fit the recipient's modulus.
pub fn seal(message: &[u8], aes_key: &[u8], recipient: &RsaPublicKey) -> Result<SealedMessage> {
    let ciphertext = symmetric::encrypt(message, aes_key)?;
    let encrypted_key = oaep::encrypt_oaep(aes_key, recipient)?;
    Ok(SealedMessage {
        encrypted_key,
        ciphertext,
    })
}

/// Like [`seal`], with a fresh random 32-byte AES key.
pub fn seal_with_random_key(message: &[u8], recipient: &RsaPublicKey) -> Result<SealedMessage> {
    let aes_key = symmetric::generate_key(32)?;
    seal(message, &aes_key, recipient)
}

/// Recover the AES key with `private_key`, then decrypt the message.
pub fn open(sealed: &SealedMessage, private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
    let aes_key = oaep::decrypt_oaep(&sealed.encrypted_key, private_key)?;
    symmetric::decrypt(&sealed.ciphertext, &aes_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_keys;

    #[test]
    fn test_seal_and_open() {
        let sealed = seal(
            b"S0000232",
            b"LKHlhb899Y09olUiLKHlhb899Y09olUi",
            &test_keys::public_key(),
        )
        .unwrap();
        assert_eq!(open(&sealed, test_keys::private_key()).unwrap(), b"S0000232");
    }

    #[test]
    fn test_seal_with_random_key() {
        let message = vec![0x5A; 1000];
        let sealed = seal_with_random_key(&message, &test_keys::public_key()).unwrap();
        assert_eq!(open(&sealed, test_keys::private_key()).unwrap(), message);
    }

    #[test]
    fn test_json_roundtrip() {
        let sealed = seal_with_random_key(b"hello", &test_keys::public_key()).unwrap();
        let json = sealed.to_json().unwrap();
        let parsed = SealedMessage::from_json(&json).unwrap();
        assert_eq!(parsed, sealed);
        assert_eq!(open(&parsed, test_keys::private_key()).unwrap(), b"hello");
    }

    #[test]
    fn test_wrong_recipient_fails() {
        let sealed = seal_with_random_key(b"hello", &test_keys::public_key()).unwrap();
        assert!(matches!(
            open(&sealed, test_keys::other_private_key()),
            Err(Error::Decrypt(_))
        ));
    }

    #[test]
    fn test_invalid_aes_key() {
        let result = seal(b"hello", b"too short", &test_keys::public_key());
        assert!(matches!(result, Err(Error::InvalidKey(9))));
    }
}
