//! RSA key lifecycle: generation, PKCS1 PEM serialization and parsing.
//!
//! Private keys are written as `RSA PRIVATE KEY` blocks holding a PKCS1
//! `RSAPrivateKey` structure, public keys as `RSA PUBLIC KEY` blocks holding a
//! PKCS1 `RSAPublicKey`. Keys are immutable once created or loaded.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rsa::pkcs1::{
    DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding,
};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::pem::{self, PemBlock};

/// PEM label for PKCS1 private keys.
pub const PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";
/// PEM label for PKCS1 public keys.
pub const PUBLIC_KEY_LABEL: &str = "RSA PUBLIC KEY";

pub const DEFAULT_KEY_BITS: usize = 2048;
pub const MIN_KEY_BITS: usize = 1024;
/// Largest modulus the PKCS1 public-key decoder accepts.
pub const MAX_KEY_BITS: usize = 4096;

/// An RSA private key together with its public half.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPair {
    pub private_key: RsaPrivateKey,
    pub public_key: RsaPublicKey,
}

impl KeyPair {
    /// Generate a fresh key pair with a modulus of `bits` bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyGen`] if `bits` is outside
    /// `MIN_KEY_BITS..=MAX_KEY_BITS` or the generator fails.
    pub fn generate(bits: usize) -> Result<Self> {
        if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&bits) {
            return Err(Error::KeyGen(format!(
                "unsupported modulus size {} bits (expected {}..={})",
                bits, MIN_KEY_BITS, MAX_KEY_BITS
            )));
        }

        log::debug!("generating {}-bit RSA key pair", bits);
        let mut rng = OsRng;
        let private_key =
            RsaPrivateKey::new(&mut rng, bits).map_err(|e| Error::KeyGen(e.to_string()))?;
        Ok(Self::from_private_key(private_key))
    }

    pub fn from_private_key(private_key: RsaPrivateKey) -> Self {
        let public_key = private_key.to_public_key();
        Self {
            private_key,
            public_key,
        }
    }

    /// Write both halves as PKCS1 PEM files, replacing any existing files.
    ///
    /// Each half is first written to a hidden file next to its destination.
    /// Both are renamed into place only after both writes succeeded, so a
    /// failure while writing either half leaves the destinations untouched.
    pub fn write_pem_files(
        &self,
        private_key_path: impl AsRef<Path>,
        public_key_path: impl AsRef<Path>,
    ) -> Result<()> {
        let private_key_path = private_key_path.as_ref();
        let public_key_path = public_key_path.as_ref();
        let private_pem = private_key_to_bytes(&self.private_key)?;
        let public_pem = public_key_to_bytes(&self.public_key)?;

        let private_staged = stage_key_file(private_key_path, &private_pem)?;
        let public_staged = match stage_key_file(public_key_path, &public_pem) {
            Ok(staged) => staged,
            Err(e) => {
                discard(&private_staged);
                return Err(e);
            }
        };

        let committed = fs::rename(&private_staged, private_key_path)
            .and_then(|()| fs::rename(&public_staged, public_key_path));
        if committed.is_err() {
            discard(&private_staged);
            discard(&public_staged);
        }
        committed?;
        Ok(())
    }
}

/// Generate a key pair of `bits` bits and write it to the two PEM files.
///
/// # Arguments
///
/// * `bits` - Modulus size in bits
/// * `private_key_path` - Destination of the `RSA PRIVATE KEY` block
/// * `public_key_path` - Destination of the `RSA PUBLIC KEY` block
///
/// # Returns
///
/// The generated [`KeyPair`].
///
/// # Errors
///
/// Returns [`Error::KeyGen`] for an invalid bit size and [`Error::Io`] if
/// either file cannot be created.
pub fn generate_key_pair(
    bits: usize,
    private_key_path: impl AsRef<Path>,
    public_key_path: impl AsRef<Path>,
) -> Result<KeyPair> {
    let key_pair = KeyPair::generate(bits)?;
    key_pair.write_pem_files(private_key_path, public_key_path)?;
    Ok(key_pair)
}

/// Read and parse a PKCS1 PEM private key file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Parse`] if
/// its contents are not a PKCS1 private key.
pub fn load_private_key(path: impl AsRef<Path>) -> Result<RsaPrivateKey> {
    let path = path.as_ref();
    log::debug!("loading RSA private key from {}", path.display());
    let data = fs::read(path)?;
    bytes_to_private_key(&data)
}

/// Read and parse a PKCS1 PEM public key file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Parse`] if
/// its contents are not a PKCS1 public key.
pub fn load_public_key(path: impl AsRef<Path>) -> Result<RsaPublicKey> {
    let path = path.as_ref();
    log::debug!("loading RSA public key from {}", path.display());
    let data = fs::read(path)?;
    bytes_to_public_key(&data)
}

/// Parse an in-memory `RSA PRIVATE KEY` PEM document.
///
/// A legacy encrypted block is decrypted with an empty passphrase when the
/// `legacy-pem` feature is enabled; failure is reported as [`Error::Parse`].
pub fn bytes_to_private_key(data: &[u8]) -> Result<RsaPrivateKey> {
    let text = pem_text(data)?;
    if pem::has_encryption_header(text) {
        let der = decrypt_key_block(text, PRIVATE_KEY_LABEL)?;
        return RsaPrivateKey::from_pkcs1_der(&der).map_err(parse_error);
    }
    RsaPrivateKey::from_pkcs1_pem(text).map_err(parse_error)
}

/// Parse an in-memory `RSA PUBLIC KEY` PEM document.
///
/// Legacy encrypted blocks are handled as in [`bytes_to_private_key`].
pub fn bytes_to_public_key(data: &[u8]) -> Result<RsaPublicKey> {
    let text = pem_text(data)?;
    if pem::has_encryption_header(text) {
        let der = decrypt_key_block(text, PUBLIC_KEY_LABEL)?;
        return RsaPublicKey::from_pkcs1_der(&der).map_err(parse_error);
    }
    RsaPublicKey::from_pkcs1_pem(text).map_err(parse_error)
}

/// Serialize a private key as an `RSA PRIVATE KEY` PEM block.
pub fn private_key_to_bytes(key: &RsaPrivateKey) -> Result<Vec<u8>> {
    let pem = key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| Error::Serialize(e.to_string()))?;
    Ok(pem.as_bytes().to_vec())
}

/// Serialize a public key as an `RSA PUBLIC KEY` PEM block.
pub fn public_key_to_bytes(key: &RsaPublicKey) -> Result<Vec<u8>> {
    let pem = key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| Error::Serialize(e.to_string()))?;
    Ok(pem.into_bytes())
}

/// Calculate the SHA-256 fingerprint of the PKCS1 DER public key.
///
/// # Returns
///
/// The hash as a hexadecimal string prefixed with "sha256:".
pub fn calculate_key_id(key: &RsaPublicKey) -> Result<String> {
    let der = key
        .to_pkcs1_der()
        .map_err(|e| Error::Serialize(e.to_string()))?;
    let hash = Sha256::digest(der.as_bytes());
    Ok(format!("sha256:{}", hex::encode(hash)))
}

/// Off-thread variant of [`load_private_key`] for use inside a tokio runtime.
#[cfg(feature = "async")]
pub async fn load_private_key_async(path: impl AsRef<Path>) -> Result<RsaPrivateKey> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || load_private_key(path))
        .await
        .map_err(join_error)?
}

/// Off-thread variant of [`load_public_key`] for use inside a tokio runtime.
#[cfg(feature = "async")]
pub async fn load_public_key_async(path: impl AsRef<Path>) -> Result<RsaPublicKey> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || load_public_key(path))
        .await
        .map_err(join_error)?
}

#[cfg(feature = "async")]
fn join_error(err: tokio::task::JoinError) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::Other, err))
}

/// Write `pem` to a hidden sibling of `path` and return the staged path.
fn stage_key_file(path: &Path, pem: &[u8]) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{}' does not name a file", path.display()),
        )
    })?;
    let mut staged_name = std::ffi::OsString::from(".");
    staged_name.push(file_name);
    staged_name.push(".tmp");
    let staged = path.with_file_name(staged_name);

    log::debug!("writing RSA key to {}", path.display());
    fs::write(&staged, pem)?;
    Ok(staged)
}

fn discard(staged: &Path) {
    if let Err(e) = fs::remove_file(staged) {
        if e.kind() != io::ErrorKind::NotFound {
            log::warn!("could not remove {}: {}", staged.display(), e);
        }
    }
}

fn pem_text(data: &[u8]) -> Result<&str> {
    std::str::from_utf8(data)
        .map_err(|_| Error::Parse("PEM data is not valid UTF-8".to_string()))
}

fn parse_error(err: rsa::pkcs1::Error) -> Error {
    Error::Parse(err.to_string())
}

fn decrypt_key_block(text: &str, label: &str) -> Result<Vec<u8>> {
    let block = PemBlock::parse(text)?;
    if block.label() != label {
        return Err(Error::Parse(format!(
            "expected PEM block '{}', found '{}'",
            label,
            block.label()
        )));
    }
    decrypt_legacy_block(&block)
}

#[cfg(feature = "legacy-pem")]
fn decrypt_legacy_block(block: &PemBlock) -> Result<Vec<u8>> {
    log::warn!(
        "'{}' PEM block is encrypted; attempting decryption with an empty passphrase",
        block.label()
    );
    block.decrypt_legacy(b"")
}

#[cfg(not(feature = "legacy-pem"))]
fn decrypt_legacy_block(block: &PemBlock) -> Result<Vec<u8>> {
    Err(Error::Parse(format!(
        "encrypted '{}' PEM blocks are not supported",
        block.label()
    )))
}
