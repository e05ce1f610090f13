//! "Reverse direction" RSA: private-exponent encrypt, public-exponent decrypt.
//!
//! The forward transform builds a PKCS1 v1.5 block-type-1 encoding by hand
//!
//! ```text
//! 0x00 || 0x01 || 0xFF .. 0xFF || 0x00 || message
//! ```
//!
//! and raises it to the private exponent. The inverse raises the ciphertext to
//! the public exponent and returns the bytes following the first `0xFF 0x00`
//! marker.
//!
//! There is no integrity check: any `k`-byte ciphertext decrypts to *some*
//! byte sequence, and a wrong key is only detectable through a missing marker
//! ([`Error::BadPadding`]) or a plaintext of an unexpected shape. The modular
//! exponentiation is not constant-time.

use base64::{engine::general_purpose, Engine as _};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use crate::error::{Error, Result};

/// Bytes of fixed overhead in the block-type-1 encoding (2 header bytes,
/// at least 8 filler bytes, 1 separator).
pub const PADDING_OVERHEAD: usize = 11;

const BLOCK_TYPE: u8 = 0x01;
const FILLER: u8 = 0xFF;
const SEPARATOR: u8 = 0x00;
const MARKER: [u8; 2] = [FILLER, SEPARATOR];
const MARKER_SCAN_START: usize = 2;

/// A big-endian unsigned integer held in exactly `width` bytes.
///
/// Constructing from an integer always left-pads with zeros, since
/// `BigUint::to_bytes_be` drops leading zero bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedWidthBlock {
    bytes: Vec<u8>,
}

impl FixedWidthBlock {
    /// Encode `value` in exactly `width` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encrypt`] if `value` needs more than `width` bytes.
    pub fn from_uint(value: &BigUint, width: usize) -> Result<Self> {
        let raw = value.to_bytes_be();
        // Zero encodes as a single 0x00 byte.
        let raw = match raw.iter().position(|&b| b != 0) {
            Some(first) => &raw[first..],
            None => &[][..],
        };
        if raw.len() > width {
            return Err(Error::Encrypt(format!(
                "integer of {} bytes does not fit a {}-byte block",
                raw.len(),
                width
            )));
        }

        let mut bytes = vec![0u8; width];
        bytes[width - raw.len()..].copy_from_slice(raw);
        Ok(Self { bytes })
    }

    /// Wrap bytes that must be exactly `width` long.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decrypt`] if `bytes` has any other length.
    pub fn from_bytes(bytes: Vec<u8>, width: usize) -> Result<Self> {
        if bytes.len() != width {
            return Err(Error::Decrypt(format!(
                "block is {} bytes, expected {}",
                bytes.len(),
                width
            )));
        }
        Ok(Self { bytes })
    }

    pub fn width(&self) -> usize {
        self.bytes.len()
    }

    pub fn to_uint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Build the `k`-byte block-type-1 encoding of `message`.
fn encode_block(message: &[u8], k: usize) -> Result<FixedWidthBlock> {
    let max = k.saturating_sub(PADDING_OVERHEAD);
    if k < PADDING_OVERHEAD || message.len() > max {
        return Err(Error::MessageTooLong {
            len: message.len(),
            max,
        });
    }

    let separator = k - message.len() - 1;
    let mut em = vec![0u8; k];
    em[1] = BLOCK_TYPE;
    em[2..separator].fill(FILLER);
    em[separator] = SEPARATOR;
    em[separator + 1..].copy_from_slice(message);
    Ok(FixedWidthBlock { bytes: em })
}

enum MarkerScan {
    Searching(usize),
    Found(usize),
    Exhausted,
}

/// Offset of the first byte after the first `0xFF 0x00` marker at or after
/// index 2.
fn locate_plaintext(block: &[u8]) -> Result<usize> {
    let mut state = MarkerScan::Searching(MARKER_SCAN_START);
    loop {
        state = match state {
            MarkerScan::Searching(i) if i + MARKER.len() > block.len() => MarkerScan::Exhausted,
            MarkerScan::Searching(i) if block[i..i + MARKER.len()] == MARKER => {
                MarkerScan::Found(i + MARKER.len())
            }
            MarkerScan::Searching(i) => MarkerScan::Searching(i + 1),
            MarkerScan::Found(offset) => return Ok(offset),
            MarkerScan::Exhausted => {
                log::debug!("no plaintext marker in {}-byte RSA block", block.len());
                return Err(Error::BadPadding);
            }
        };
    }
}

/// Transform `message` with the private exponent and return standard base64.
///
/// The result is deterministic for a fixed key and message and is always
/// exactly `k` bytes before encoding, `k` being the modulus size in bytes.
///
/// # Errors
///
/// Returns [`Error::MessageTooLong`] if `message` is longer than `k - 11` bytes.
pub fn encrypt_with_private_key(message: &[u8], private_key: &RsaPrivateKey) -> Result<String> {
    let k = private_key.size();
    let em = encode_block(message, k)?;

    let c = em.to_uint().modpow(private_key.d(), private_key.n());
    let block = FixedWidthBlock::from_uint(&c, k)?;
    Ok(general_purpose::STANDARD.encode(block.as_bytes()))
}

/// Invert [`encrypt_with_private_key`] with the public exponent.
///
/// # Errors
///
/// Returns [`Error::Decode`] for malformed base64, [`Error::Decrypt`] if the
/// ciphertext is not exactly `k` bytes, and [`Error::BadPadding`] if the
/// recovered block holds no `0xFF 0x00` marker.
pub fn decrypt_with_public_key(ciphertext: &str, public_key: &RsaPublicKey) -> Result<Vec<u8>> {
    let k = public_key.size();
    let bytes = general_purpose::STANDARD.decode(ciphertext)?;
    let c = FixedWidthBlock::from_bytes(bytes, k)?.to_uint();
    // Left unpadded: the leading 0x00 is dropped and the scan starts past 0x01.
    let out = c.modpow(public_key.e(), public_key.n()).to_bytes_be();
    let offset = locate_plaintext(&out)?;
    Ok(out[offset..].to_vec())
}
