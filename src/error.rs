use thiserror::Error;

/// Errors returned by every key, RSA and AES operation in this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Key parse error: {0}")]
    Parse(String),

    #[error("Key serialization error: {0}")]
    Serialize(String),

    #[error("Key generation error: {0}")]
    KeyGen(String),

    #[error("Message too long: {len} bytes, at most {max} allowed")]
    MessageTooLong { len: usize, max: usize },

    #[error("Encryption error: {0}")]
    Encrypt(String),

    #[error("Decryption error: {0}")]
    Decrypt(String),

    /// The `0xFF 0x00` marker was not found in a raw RSA block.
    #[error("Bad padding: no plaintext marker in decrypted block")]
    BadPadding,

    #[error("Invalid AES key length: {0} bytes (expected 16, 24 or 32)")]
    InvalidKey(usize),

    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Ciphertext length {0} is not a positive multiple of the AES block size")]
    BlockSize(usize),

    /// Declared PKCS7 pad length does not fit the decrypted buffer.
    /// This can happen when an incorrect key is used.
    #[error("Padding error: declared pad length exceeds the decrypted buffer")]
    Padding,

    #[error("Signing error: {0}")]
    Sign(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for cipherkit operations.
pub type Result<T> = std::result::Result<T, Error>;
